use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::core::Size;
use crate::foundation::error::CoverResult;
use crate::render::layers;
use crate::template::model::BlendMode;

/// Identity of a prepared layer buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerKey {
    /// Resolved file path.
    pub path: PathBuf,
    /// Target size on the canvas.
    pub size: Size,
    /// Blend mode (destination-in buffers are stored as luminance masks).
    pub blend: BlendMode,
    opacity_bits: u32,
}

impl LayerKey {
    /// Build a key; an absent opacity keys the same as `1.0`.
    pub fn new(path: impl Into<PathBuf>, size: Size, blend: BlendMode, opacity: Option<f32>) -> Self {
        let opacity = opacity.unwrap_or(1.0).clamp(0.0, 1.0);
        Self {
            path: path.into(),
            size,
            blend,
            opacity_bits: opacity.to_bits(),
        }
    }

    /// Opacity applied to the alpha channel.
    pub fn opacity(&self) -> f32 {
        f32::from_bits(self.opacity_bits)
    }
}

struct Entry {
    image: Arc<RgbaImage>,
    last_used: AtomicU64,
}

/// Process-wide memo of decoded, resized, opacity-scaled (and masked) layer buffers.
///
/// Unbounded by default; with a capacity the least recently used entry is evicted. Concurrent
/// misses on the same key may prepare twice, both producing identical buffers.
pub struct OverlayCache {
    capacity: Option<usize>,
    entries: RwLock<HashMap<LayerKey, Entry>>,
    clock: AtomicU64,
    prepared: AtomicU64,
}

impl std::fmt::Debug for OverlayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("prepared", &self.prepare_count())
            .finish()
    }
}

impl Default for OverlayCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OverlayCache {
    /// Create a cache; `None` keeps every entry for the life of the process.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity: capacity.filter(|c| *c > 0),
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            prepared: AtomicU64::new(0),
        }
    }

    /// Prepared buffer for `key`, or `None` when the asset file does not exist.
    pub fn get_prepared(&self, key: &LayerKey) -> CoverResult<Option<Arc<RgbaImage>>> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = entries.get(key) {
                entry.last_used.store(tick, Ordering::Relaxed);
                return Ok(Some(Arc::clone(&entry.image)));
            }
        }

        if !key.path.is_file() {
            tracing::debug!(path = %key.path.display(), "layer asset missing, skipping");
            return Ok(None);
        }

        let image = Arc::new(prepare_layer(&key.path, key.size, key.blend, key.opacity())?);
        self.prepared.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(cap) = self.capacity
            && entries.len() >= cap
            && !entries.contains_key(key)
        {
            let victim = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                entries.remove(&victim);
            }
        }
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry {
            image: Arc::clone(&image),
            last_used: AtomicU64::new(tick),
        });
        Ok(Some(Arc::clone(&entry.image)))
    }

    /// Number of cached buffers.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a buffer was decoded and prepared (cache misses on existing files).
    pub fn prepare_count(&self) -> u64 {
        self.prepared.load(Ordering::Relaxed)
    }
}

/// Decode, resize, apply opacity and (for destination-in) convert to a luminance mask.
pub fn prepare_layer(path: &Path, size: Size, blend: BlendMode, opacity: f32) -> CoverResult<RgbaImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read layer asset '{}'", path.display()))?;
    let decoded = image::load_from_memory(&bytes)
        .with_context(|| format!("decode layer asset '{}'", path.display()))?
        .to_rgba8();

    let mut img = layers::resize_exact(&decoded, size);
    if opacity < 1.0 {
        layers::apply_opacity(&mut img, opacity);
    }
    if blend == BlendMode::DestinationIn {
        layers::luminance_mask(&mut img);
    }
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
