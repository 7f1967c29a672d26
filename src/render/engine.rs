use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::core::{Background, MAX_OUTPUT_SIDE, PxRect, Size};
use crate::foundation::error::{CoverError, CoverResult, ValidationIssues};
use crate::render::cache::{LayerKey, OverlayCache};
use crate::render::composite::Surface;
use crate::render::encode::{self, DEFAULT_QUALITY, OutputFormat};
use crate::render::geometry::{CanvasGeometry, PosterPlacement};
use crate::render::jitter::JitterPlan;
use crate::render::layers::{self, FitMode};
use crate::render::source::{self, AssetRoot, RenderSource};
use crate::template::model::{BlendMode, ColorGrade, OverlayLayer, validate_layer};
use crate::template::registry::TemplateRegistry;

/// One rendering invocation, as accepted by the render entrypoint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Poster source.
    pub source: RenderSource,
    /// Template id; absent or unknown ids fall back to the default template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Fit mode of the poster inside its render rectangle.
    #[serde(default)]
    pub fit: FitMode,
    /// Output size override; defaults to the template's native size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Ad-hoc overlays composited after the template's own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<OverlayLayer>,
    /// Output container.
    #[serde(default)]
    pub format: OutputFormat,
    /// Encoder quality, clamped into `1..=100`.
    #[serde(default = "default_quality")]
    pub quality: i64,
    /// Canvas fill.
    #[serde(default)]
    pub background: Background,
    /// Seed for poster jitter; without it jitter is off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<String>,
}

fn default_quality() -> i64 {
    i64::from(DEFAULT_QUALITY)
}

impl RenderRequest {
    /// Request with every option at its default.
    pub fn new(source: RenderSource) -> Self {
        Self {
            source,
            template_id: None,
            fit: FitMode::default(),
            size: None,
            overlays: Vec::new(),
            format: OutputFormat::default(),
            quality: default_quality(),
            background: Background::default(),
            random_seed: None,
        }
    }
}

/// A layer with its asset resolved and geometry mapped onto the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedLayer {
    /// Resolved asset file.
    pub path: PathBuf,
    /// Placement on the canvas.
    pub rect: PxRect,
    /// Blend mode.
    pub blend: BlendMode,
    /// Alpha multiplier.
    pub opacity: Option<f32>,
}

impl PlannedLayer {
    fn cache_key(&self) -> LayerKey {
        LayerKey::new(&self.path, self.rect.size(), self.blend, self.opacity)
    }
}

/// Resolved, validated form of a [`RenderRequest`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    /// Id of the template actually used.
    pub template_id: String,
    /// Canvas and poster geometry.
    pub geometry: CanvasGeometry,
    /// Seeded poster perturbation.
    pub jitter: JitterPlan,
    /// Poster fit mode.
    pub fit: FitMode,
    /// Poster color adjustment.
    pub grade: ColorGrade,
    /// Composite the scanline layer.
    pub scanlines: bool,
    /// Canvas fill.
    pub background: Background,
    /// Layers below the poster.
    pub underlays: Vec<PlannedLayer>,
    /// Template overlays followed by request overlays.
    pub overlays: Vec<PlannedLayer>,
    /// Output container.
    pub format: OutputFormat,
    /// Clamped quality.
    pub quality: u8,
}

/// Encoded cover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedImage {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
}

/// Poster-to-cover compositing engine.
///
/// Cheap to clone; clones share the registry and the overlay cache.
#[derive(Clone, Debug)]
pub struct Renderer {
    registry: Arc<TemplateRegistry>,
    cache: Arc<OverlayCache>,
    assets: AssetRoot,
    client: reqwest::Client,
}

impl Renderer {
    /// Assemble a renderer from its shared parts.
    pub fn new(
        registry: Arc<TemplateRegistry>,
        cache: Arc<OverlayCache>,
        assets: AssetRoot,
        client: reqwest::Client,
    ) -> Self {
        Self {
            registry,
            cache,
            assets,
            client,
        }
    }

    /// Template catalog.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Shared overlay cache.
    pub fn cache(&self) -> &OverlayCache {
        &self.cache
    }

    /// Sandboxed asset root.
    pub fn assets(&self) -> &AssetRoot {
        &self.assets
    }

    /// Validate `req` and resolve everything that needs no source bytes.
    ///
    /// Fails before any I/O: malformed fields are collected into one validation error, and
    /// layer paths escaping the asset root are security errors.
    pub fn plan(&self, req: &RenderRequest) -> CoverResult<RenderPlan> {
        let mut issues = ValidationIssues::default();
        if let Some(size) = req.size {
            if size.is_empty() {
                issues.push("size", "width/height must be > 0");
            } else if size.is_oversized() {
                issues.push(
                    "size",
                    format!("width/height must be <= {MAX_OUTPUT_SIDE}, got {size}"),
                );
            }
        }
        for (i, layer) in req.overlays.iter().enumerate() {
            if let Err(msg) = validate_layer(layer) {
                issues.push(format!("overlays[{i}]"), msg);
            }
        }
        if let Err(e) = req.source.validate(&self.assets) {
            match e {
                CoverError::Validation(v) => {
                    for issue in v.issues() {
                        issues.push(issue.field.clone(), issue.message.clone());
                    }
                }
                other => return Err(other),
            }
        }
        issues.into_result()?;

        let template = self.registry.get_template_by_id(req.template_id.as_deref());
        let geometry = CanvasGeometry::for_template(template, req.size);
        let jitter = JitterPlan::compute(
            template.poster_jitter.as_ref(),
            req.random_seed.as_deref(),
            geometry.scale,
        );

        let underlays = template
            .underlays
            .iter()
            .map(|layer| self.plan_layer(layer, &geometry, template.output))
            .collect::<CoverResult<Vec<_>>>()?;
        let overlays = template
            .overlays
            .iter()
            .chain(&req.overlays)
            .map(|layer| self.plan_layer(layer, &geometry, template.output))
            .collect::<CoverResult<Vec<_>>>()?;

        Ok(RenderPlan {
            template_id: template.id.clone(),
            geometry,
            jitter,
            fit: req.fit,
            grade: template.grade,
            scanlines: template.scanlines,
            background: req.background,
            underlays,
            overlays,
            format: req.format,
            quality: encode::clamp_quality(req.quality),
        })
    }

    fn plan_layer(
        &self,
        layer: &OverlayLayer,
        geometry: &CanvasGeometry,
        native: Size,
    ) -> CoverResult<PlannedLayer> {
        Ok(PlannedLayer {
            path: self.assets.resolve(&layer.public_path)?,
            rect: geometry.layer_rect(layer, native),
            blend: layer.blend,
            opacity: layer.opacity,
        })
    }

    /// Render one cover: plan, load the source, then composite on a blocking worker.
    #[tracing::instrument(skip_all, fields(template = ?req.template_id, source = req.source.kind()))]
    pub async fn render(&self, req: &RenderRequest) -> CoverResult<RenderedImage> {
        let plan = self.plan(req)?;
        let bytes = source::load_source_bytes(&req.source, &self.assets, &self.client).await?;

        let this = self.clone();
        tokio::task::spawn_blocking(move || this.compose(&bytes, &plan))
            .await
            .context("compose worker panicked")?
    }

    /// Synchronous compositing core: decode, place, composite, encode.
    #[tracing::instrument(skip_all, fields(template = %plan.template_id, canvas = %plan.geometry.canvas))]
    pub fn compose(&self, source_bytes: &[u8], plan: &RenderPlan) -> CoverResult<RenderedImage> {
        let src = image::load_from_memory(source_bytes)
            .map_err(|e| CoverError::validation("source", format!("undecodable image: {e}")))?
            .to_rgba8();

        let slot = plan.geometry.poster;
        let poster = render_poster(&src, slot.size(), plan);

        let mut surface = Surface::new(plan.geometry.canvas, plan.background);
        self.composite_layers(&mut surface, &plan.underlays)?;
        surface.composite(&poster, slot, BlendMode::Over);
        if plan.scanlines {
            surface.composite(
                &layers::scanline_layer(slot.size()),
                slot,
                BlendMode::SoftLight,
            );
        }
        self.composite_layers(&mut surface, &plan.overlays)?;

        let bytes = encode::encode(&surface.into_rgba_image(), plan.format, plan.quality)?;
        tracing::debug!(
            jitter = plan.jitter.active,
            bytes = bytes.len(),
            "composed cover"
        );
        Ok(RenderedImage {
            bytes,
            content_type: plan.format.content_type(),
        })
    }

    fn composite_layers(&self, surface: &mut Surface, planned: &[PlannedLayer]) -> CoverResult<()> {
        for layer in planned {
            if let Some(buf) = self.cache.get_prepared(&layer.cache_key())? {
                surface.composite(&buf, layer.rect, layer.blend);
            }
        }
        Ok(())
    }
}

/// Fit the source into the jittered render rectangle, grade it, and cut out the slot window.
pub fn render_poster(src: &RgbaImage, slot: Size, plan: &RenderPlan) -> RgbaImage {
    let placement = PosterPlacement::compute(slot, &plan.jitter);
    let mut fitted = layers::fit_into(src, placement.render, plan.fit);
    layers::apply_grade(&mut fitted, &plan.grade);
    layers::crop(
        &fitted,
        placement.extract_left,
        placement.extract_top,
        slot,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
