use crate::foundation::core::Size;
use crate::render::encode::OutputFormat;
use crate::sync::orchestrator::ImageKind;

/// Compositing pipeline marker embedded in every cover file name.
///
/// Bump whenever template geometry or the compositing algorithm changes so stale covers stop
/// matching.
pub const PIPELINE_VERSION: &str = "p3";
/// Renderer tag embedded in cover file names.
pub const RENDERER_TAG: &str = "native";

const MAX_TITLE_SLUG: usize = 48;

/// Inputs of a cover file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverNameParts<'a> {
    /// How the movie was selected (`id`, a list category, `search`).
    pub selector: &'a str,
    /// Catalog id.
    pub movie_id: i64,
    /// Poster or backdrop.
    pub kind: ImageKind,
    /// Template actually used.
    pub template_id: &'a str,
    /// Movie title.
    pub title: &'a str,
    /// Output container.
    pub format: OutputFormat,
    /// Output size override; `None` renders at the template's native size.
    pub size: Option<Size>,
}

/// Lowercase ASCII alphanumerics joined by single `-`; empty input becomes `untitled`.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("untitled");
    }
    out
}

/// `{selector}-{movieId}-{kind}-{renderer}-{templateSlug}-{PIPELINE_VERSION}[-{W}x{H}]-{titleSlug}.{ext}`
///
/// The size segment is present only for non-native sizes.
pub fn cover_file_name(parts: &CoverNameParts<'_>) -> String {
    let mut title = slugify(parts.title);
    if title.len() > MAX_TITLE_SLUG {
        title.truncate(MAX_TITLE_SLUG);
        while title.ends_with('-') {
            title.pop();
        }
    }
    let size = parts
        .size
        .map(|s| format!("-{}x{}", s.width, s.height))
        .unwrap_or_default();
    format!(
        "{}-{}-{}-{}-{}-{}{}-{}.{}",
        slugify(parts.selector),
        parts.movie_id,
        parts.kind.as_str(),
        RENDERER_TAG,
        slugify(parts.template_id),
        slugify(PIPELINE_VERSION),
        size,
        title,
        parts.format.extension(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/sync/naming.rs"]
mod tests;
