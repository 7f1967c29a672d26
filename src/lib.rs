//! vhs-cover turns movie posters into stylized VHS cassette covers and keeps ranked boards of
//! those cassettes.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: `RenderRequest -> RenderPlan` (template lookup with fallback, per-axis rescale,
//!    seeded jitter, sandboxed layer paths). No I/O.
//! 2. **Load**: the poster source is fetched (HTTP), read from the asset root, or read from disk.
//! 3. **Compose**: fit, grade, and window the poster, then composite underlays, poster,
//!    scanlines, and overlays on a premultiplied RGBA8 [`Surface`].
//! 4. **Encode**: PNG or WebP.
//!
//! Boards live in one JSON document managed by [`BoardStore`], with optimistic concurrency on a
//! monotonically increasing version and a deterministic ranking recomputed on every write.
//! [`CoverSync`] ties a [`MovieCatalog`] to the renderer and names output files so that a
//! template or [`PIPELINE_VERSION`] change invalidates old covers.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same request and seed always produce the same bytes.
//! - **Typed errors**: library calls return [`CoverError`] and leave logging of failures to the
//!   caller.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod board;
mod config;
mod foundation;
mod render;
mod sync;
mod template;

pub use board::hierarchy::{compute_hierarchy, leader_of, rank_order};
pub use board::model::{
    BoardMovie, BoardMovieInput, BoardState, BoardWrite, DEFAULT_BOARD_ID, MAX_BOARD_MOVIES,
    MAX_SCORE, board_id_or_default, validate_movies,
};
pub use board::store::BoardStore;
pub use config::EngineConfig;
pub use foundation::core::{Background, MAX_OUTPUT_SIDE, PxRect, Size};
pub use foundation::error::{CoverError, CoverResult, ValidationIssue, ValidationIssues};
pub use render::cache::{LayerKey, OverlayCache, prepare_layer};
pub use render::composite::{PremulRgba8, Surface, blend_pixel, over};
pub use render::encode::{DEFAULT_QUALITY, OutputFormat, clamp_quality, encode};
pub use render::engine::{PlannedLayer, RenderPlan, RenderRequest, RenderedImage, Renderer};
pub use render::geometry::{CanvasGeometry, PosterPlacement, ScaleFactors};
pub use render::jitter::{JitterPlan, VERTICAL_BIAS_SCALE_FLOOR, VERTICAL_BIAS_X_FACTOR};
pub use render::layers::{
    FitMode, SCANLINE_ALPHA, SCANLINE_PERIOD, apply_grade, apply_opacity, fit_into,
    luminance_mask, scanline_layer,
};
pub use render::rng::SeededRng;
pub use render::source::{
    AssetRoot, RenderSource, build_http_client, check_content_type, load_source_bytes,
    normalize_public_path,
};
pub use sync::naming::{CoverNameParts, PIPELINE_VERSION, RENDERER_TAG, cover_file_name, slugify};
pub use sync::orchestrator::{
    CoverRecord, CoverSync, ImageKind, Movie, MovieCatalog, SyncOptions,
};
pub use template::model::{BlendMode, ColorGrade, OverlayLayer, PosterJitter, Template};
pub use template::registry::{
    DEFAULT_TEMPLATE_ID, TemplateListing, TemplateRegistry, TemplateSummary,
};
