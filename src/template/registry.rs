use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{PxRect, Size};
use crate::foundation::error::{CoverError, CoverResult};
use crate::template::model::{BlendMode, ColorGrade, OverlayLayer, PosterJitter, Template};

/// Id of the fallback template of the built-in catalog.
pub const DEFAULT_TEMPLATE_ID: &str = "vhs-classic";

/// Immutable template catalog with guaranteed fallback lookup.
///
/// The first entry is the fallback returned for absent or unknown ids.
#[derive(Clone, Debug)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

/// Read-only summary of one template, as exposed by the listing entrypoint.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    /// Template id.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Native canvas size.
    pub output: Size,
    /// Poster slot geometry.
    pub poster: PxRect,
    /// Number of overlay layers.
    pub overlay_count: usize,
}

/// Registry contents plus the default id.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListing {
    /// Id returned for absent/unknown lookups.
    pub default_template_id: String,
    /// All templates in catalog order.
    pub templates: Vec<TemplateSummary>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { templates: Vec<Template> },
    Bare(Vec<Template>),
}

impl TemplateRegistry {
    /// Build a registry from a custom catalog.
    ///
    /// Fails with [`CoverError::Config`] when the catalog is empty, an id repeats, or a
    /// template breaks its geometry invariants.
    pub fn from_templates(templates: Vec<Template>) -> CoverResult<Self> {
        if templates.is_empty() {
            return Err(CoverError::config("template catalog must not be empty"));
        }
        let mut seen = HashSet::new();
        for t in &templates {
            t.validate()?;
            if !seen.insert(t.id.as_str()) {
                return Err(CoverError::config(format!(
                    "duplicate template id '{}'",
                    t.id
                )));
            }
        }
        Ok(Self { templates })
    }

    /// The built-in catalog; its first entry is [`DEFAULT_TEMPLATE_ID`].
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Load a catalog from a JSON file holding either `[...]` or `{"templates": [...]}`.
    pub fn from_json_path(path: &Path) -> CoverResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read template catalog '{}'", path.display()))?;
        let file: CatalogFile = serde_json::from_slice(&bytes).map_err(|e| {
            CoverError::config(format!(
                "parse template catalog '{}': {e}",
                path.display()
            ))
        })?;
        let templates = match file {
            CatalogFile::Wrapped { templates } | CatalogFile::Bare(templates) => templates,
        };
        Self::from_templates(templates)
    }

    /// Fallback template (first catalog entry).
    pub fn default_template(&self) -> &Template {
        &self.templates[0]
    }

    /// Id of [`Self::default_template`].
    pub fn default_template_id(&self) -> &str {
        &self.default_template().id
    }

    /// Look up a template; absent or unknown ids resolve to the fallback.
    pub fn get_template_by_id(&self, id: Option<&str>) -> &Template {
        id.and_then(|id| self.templates.iter().find(|t| t.id == id))
            .unwrap_or_else(|| self.default_template())
    }

    /// All templates in catalog order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Summaries for the template listing entrypoint.
    pub fn listing(&self) -> TemplateListing {
        TemplateListing {
            default_template_id: self.default_template_id().to_string(),
            templates: self
                .templates
                .iter()
                .map(|t| TemplateSummary {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    output: t.output,
                    poster: t.poster,
                    overlay_count: t.overlays.len(),
                })
                .collect(),
        }
    }
}

fn builtin_templates() -> Vec<Template> {
    const CLASSIC: &str = "/VHS/templates/vhs-classic";
    const BLACK_CASE: &str = "/VHS/templates/black-case-front";

    vec![
        Template {
            id: DEFAULT_TEMPLATE_ID.to_string(),
            name: "Classic VHS sleeve".to_string(),
            output: Size::new(600, 1000),
            poster: PxRect::new(40, 120, 520, 760),
            scanlines: true,
            poster_jitter: Some(PosterJitter {
                chance: 0.85,
                max_offset_x: 14.0,
                max_offset_y: 18.0,
                max_scale_pct: 0.12,
                vertical_bias_chance: 0.35,
                vertical_bias_multiplier: 1.6,
            }),
            underlays: vec![OverlayLayer::new(
                format!("{CLASSIC}/sleeve-base.png"),
                BlendMode::Over,
            )],
            overlays: vec![
                OverlayLayer::new(
                    format!("{CLASSIC}/sleeve-silhouette.png"),
                    BlendMode::DestinationIn,
                ),
                OverlayLayer::new(format!("{CLASSIC}/sleeve-wear.png"), BlendMode::Multiply)
                    .with_opacity(0.55),
                OverlayLayer::new(format!("{CLASSIC}/sleeve-gloss.png"), BlendMode::Screen)
                    .with_opacity(0.35),
            ],
            grade: ColorGrade::CLASSIC,
        },
        Template {
            id: "black-case-front".to_string(),
            name: "Black VHS case (front)".to_string(),
            output: Size::new(1500, 2250),
            poster: PxRect::new(262, 300, 976, 1650),
            scanlines: false,
            poster_jitter: None,
            underlays: vec![
                OverlayLayer::new(format!("{BLACK_CASE}/front-shadow-underlay.png"), BlendMode::Over)
                    .with_opacity(0.5),
                OverlayLayer::new(format!("{BLACK_CASE}/front-case-underlay.png"), BlendMode::Over)
                    .with_opacity(1.0),
            ],
            overlays: vec![
                OverlayLayer::new(
                    format!("{BLACK_CASE}/front-texture-plastic.png"),
                    BlendMode::Screen,
                )
                .with_opacity(1.0),
                OverlayLayer::new(
                    format!("{BLACK_CASE}/front-texture-scratches.png"),
                    BlendMode::Over,
                )
                .with_opacity(0.5),
            ],
            grade: ColorGrade::BLACK_CASE,
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/template/registry.rs"]
mod tests;
