use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;

use crate::board::store::BoardStore;
use crate::foundation::error::{CoverError, CoverResult};
use crate::render::cache::OverlayCache;
use crate::render::engine::Renderer;
use crate::render::source::{AssetRoot, build_http_client};
use crate::template::registry::TemplateRegistry;

/// Process-level settings for the engine, the board store, and cover sync.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Sandboxed root for public paths.
    pub asset_root: PathBuf,
    /// Directory generated covers are written to.
    pub cover_dir: PathBuf,
    /// JSON document holding every board.
    pub board_path: PathBuf,
    /// Whole-request timeout for remote source fetches, in seconds.
    pub fetch_timeout_secs: u64,
    /// Bound on cached overlay buffers; absent keeps everything.
    pub overlay_cache_capacity: Option<usize>,
    /// Custom template catalog; absent uses the built-in one.
    pub templates_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("public"),
            cover_dir: PathBuf::from("public/covers"),
            board_path: PathBuf::from("data/boards.json"),
            fetch_timeout_secs: 15,
            overlay_cache_capacity: None,
            templates_path: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config file.
    pub fn from_path(path: &Path) -> CoverResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            CoverError::config(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> CoverResult<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(CoverError::config("fetchTimeoutSecs must be > 0"));
        }
        if self.overlay_cache_capacity == Some(0) {
            return Err(CoverError::config(
                "overlayCacheCapacity must be > 0 (omit it for an unbounded cache)",
            ));
        }
        Ok(())
    }

    /// Remote fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// The configured template catalog.
    pub fn load_registry(&self) -> CoverResult<TemplateRegistry> {
        match &self.templates_path {
            Some(path) => TemplateRegistry::from_json_path(path),
            None => Ok(TemplateRegistry::builtin()),
        }
    }

    /// A renderer wired with this config's catalog, cache, asset root, and HTTP client.
    pub fn build_renderer(&self) -> CoverResult<Renderer> {
        self.validate()?;
        Ok(Renderer::new(
            Arc::new(self.load_registry()?),
            Arc::new(OverlayCache::new(self.overlay_cache_capacity)),
            AssetRoot::new(&self.asset_root),
            build_http_client(self.fetch_timeout())?,
        ))
    }

    /// Board store at [`Self::board_path`].
    pub fn board_store(&self) -> BoardStore {
        BoardStore::new(&self.board_path)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
