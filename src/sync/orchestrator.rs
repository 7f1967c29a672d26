use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{CoverError, CoverResult};
use crate::foundation::fsio::atomic_write;
use crate::render::encode::OutputFormat;
use crate::render::engine::{RenderRequest, Renderer};
use crate::render::source::RenderSource;
use crate::sync::naming::{CoverNameParts, cover_file_name};

/// Which catalog image a cover is built from.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Portrait poster art.
    #[default]
    Poster,
    /// Landscape backdrop still.
    Backdrop,
}

impl ImageKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::Backdrop => "backdrop",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog metadata for one movie.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Catalog id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Release year, when known.
    #[serde(default)]
    pub release_year: Option<i32>,
    /// Poster image URL.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Backdrop image URL.
    #[serde(default)]
    pub backdrop_url: Option<String>,
}

impl Movie {
    /// Image URL for `kind`.
    pub fn image_url(&self, kind: ImageKind) -> Option<&str> {
        match kind {
            ImageKind::Poster => self.poster_url.as_deref(),
            ImageKind::Backdrop => self.backdrop_url.as_deref(),
        }
        .filter(|u| !u.trim().is_empty())
    }
}

/// Third-party metadata and image source.
pub trait MovieCatalog: Send + Sync {
    /// One page of a named list (e.g. `popular`).
    fn list_movies(
        &self,
        category: &str,
        page: u32,
    ) -> impl Future<Output = CoverResult<Vec<Movie>>> + Send;

    /// Free-text search.
    fn search_movies(&self, query: &str) -> impl Future<Output = CoverResult<Vec<Movie>>> + Send;

    /// Metadata for one id, `None` when unknown.
    fn get_movie_by_id(&self, id: i64) -> impl Future<Output = CoverResult<Option<Movie>>> + Send;

    /// Download `url` into a local cache and return the file path.
    fn fetch_and_cache_image(
        &self,
        id: i64,
        url: &str,
        kind: ImageKind,
    ) -> impl Future<Output = CoverResult<PathBuf>> + Send;
}

/// Per-call sync settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    /// Template id; unknown ids fall back to the default template.
    #[serde(default)]
    pub template_id: Option<String>,
    /// Source image kind.
    #[serde(default)]
    pub kind: ImageKind,
    /// Re-render even when the output file exists.
    #[serde(default)]
    pub force: bool,
    /// Output size override.
    #[serde(default)]
    pub size: Option<Size>,
    /// Output container.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            template_id: None,
            kind: ImageKind::Poster,
            force: false,
            size: None,
            format: OutputFormat::Webp,
        }
    }
}

/// Result of syncing one movie.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverRecord {
    /// Catalog id.
    pub movie_id: i64,
    /// Title.
    pub title: String,
    /// Source image kind.
    pub kind: ImageKind,
    /// Template actually used.
    pub template_id: String,
    /// Deterministic file name.
    pub file_name: String,
    /// Full path of the cover.
    pub path: PathBuf,
    /// `true` when an existing file was reused.
    pub cached: bool,
}

/// Ties a catalog to the renderer and the generated-cover directory.
pub struct CoverSync<C> {
    catalog: C,
    renderer: Renderer,
    cover_dir: PathBuf,
}

impl<C: MovieCatalog> CoverSync<C> {
    /// Covers are written under `cover_dir`.
    pub fn new(catalog: C, renderer: Renderer, cover_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            renderer,
            cover_dir: cover_dir.into(),
        }
    }

    /// Directory covers are written to.
    pub fn cover_dir(&self) -> &Path {
        &self.cover_dir
    }

    /// Underlying catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Ensure a cover exists for every id, in order. The first failure aborts the batch.
    #[tracing::instrument(skip(self, opts), fields(count = ids.len(), template = ?opts.template_id))]
    pub async fn sync(&self, ids: &[i64], opts: &SyncOptions) -> CoverResult<Vec<CoverRecord>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            let movie = self
                .catalog
                .get_movie_by_id(id)
                .await?
                .ok_or_else(|| CoverError::not_found(format!("movie {id}")))?;
            out.push(self.sync_movie("id", &movie, opts).await?);
        }
        Ok(out)
    }

    /// Sync one page of a catalog list; movies lacking the requested image are skipped.
    pub async fn sync_category(
        &self,
        category: &str,
        page: u32,
        opts: &SyncOptions,
    ) -> CoverResult<Vec<CoverRecord>> {
        let movies = self.catalog.list_movies(category, page).await?;
        self.sync_listed(category, &movies, opts).await
    }

    /// Sync search results; movies lacking the requested image are skipped.
    pub async fn sync_search(
        &self,
        query: &str,
        opts: &SyncOptions,
    ) -> CoverResult<Vec<CoverRecord>> {
        let movies = self.catalog.search_movies(query).await?;
        self.sync_listed("search", &movies, opts).await
    }

    async fn sync_listed(
        &self,
        selector: &str,
        movies: &[Movie],
        opts: &SyncOptions,
    ) -> CoverResult<Vec<CoverRecord>> {
        let mut out = Vec::with_capacity(movies.len());
        for movie in movies {
            if movie.image_url(opts.kind).is_none() {
                tracing::debug!(movie = movie.id, kind = %opts.kind, "no image, skipping");
                continue;
            }
            out.push(self.sync_movie(selector, movie, opts).await?);
        }
        Ok(out)
    }

    /// Build (or reuse) the cover of one movie.
    pub async fn sync_movie(
        &self,
        selector: &str,
        movie: &Movie,
        opts: &SyncOptions,
    ) -> CoverResult<CoverRecord> {
        let url = movie.image_url(opts.kind).ok_or_else(|| {
            CoverError::not_found(format!("movie {} has no {} image", movie.id, opts.kind))
        })?;
        let template_id = self
            .renderer
            .registry()
            .get_template_by_id(opts.template_id.as_deref())
            .id
            .clone();

        let file_name = cover_file_name(&CoverNameParts {
            selector,
            movie_id: movie.id,
            kind: opts.kind,
            template_id: &template_id,
            title: &movie.title,
            format: opts.format,
            size: opts.size,
        });
        let path = self.cover_dir.join(&file_name);

        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("stat cover '{}'", path.display()))?;
        let cached = exists && !opts.force;
        if !cached {
            let source = self
                .catalog
                .fetch_and_cache_image(movie.id, url, opts.kind)
                .await?;
            let mut req = RenderRequest::new(RenderSource::LocalFile(source));
            req.template_id = Some(template_id.clone());
            req.size = opts.size;
            req.format = opts.format;
            req.random_seed = Some(format!("{}:{}", movie.id, template_id));

            let rendered = self.renderer.render(&req).await?;
            atomic_write(&path, &rendered.bytes)
                .await
                .with_context(|| format!("write cover '{}'", path.display()))?;
            tracing::info!(movie = movie.id, file = %file_name, "cover rendered");
        }

        Ok(CoverRecord {
            movie_id: movie.id,
            title: movie.title.clone(),
            kind: opts.kind,
            template_id,
            file_name,
            path,
            cached,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/orchestrator.rs"]
mod tests;
