use crate::foundation::error::{ViewError, ViewResult};
use crate::render::backend::SurfaceDesc;
use std::collections::HashMap;

/// Environment override for [`SurfacePoolOpts::max_pool_bytes`].
pub const POOL_MAX_BYTES_ENV: &str = "VIEWBOX_POOL_MAX_BYTES";

/// Pool configuration for cached offscreen surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per (w,h,format) bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 256 * 1024 * 1024,
            max_surfaces_per_bucket: 8,
        }
    }
}

impl SurfacePoolOpts {
    /// Defaults, with `VIEWBOX_POOL_MAX_BYTES` applied when it parses as a byte count.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(bytes) = std::env::var(POOL_MAX_BYTES_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            opts.max_pool_bytes = bytes;
        }
        opts
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SurfacePoolStats {
    pub retained_surfaces: usize,
    pub retained_bytes: usize,
    pub alloc_surfaces: u64,
    pub alloc_bytes: u64,
    pub reused_surfaces: u64,
    pub dropped_on_release: u64,
}

struct Bucket {
    surfaces: Vec<vello_cpu::Pixmap>,
}

/// Bounded pooled allocator for CPU pixmaps backing offscreen viewbox buffers.
///
/// Keyed by `(width, height, format)`. Surfaces handed out by [`SurfacePool::borrow`] are
/// always cleared to transparent.
pub(crate) struct SurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    buckets: HashMap<SurfaceDesc, Bucket>,
}

impl SurfacePool {
    pub(crate) fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    pub(crate) fn stats(&self) -> SurfacePoolStats {
        self.stats.clone()
    }

    pub(crate) fn borrow(&mut self, desc: SurfaceDesc) -> ViewResult<vello_cpu::Pixmap> {
        if let Some(mut p) = self
            .buckets
            .get_mut(&desc)
            .and_then(|bucket| bucket.surfaces.pop())
        {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(desc.byte_len());
            self.stats.reused_surfaces = self.stats.reused_surfaces.saturating_add(1);
            p.data_as_u8_slice_mut().fill(0);
            return Ok(p);
        }

        let w: u16 = desc.width.try_into().map_err(|_| {
            ViewError::render(format!("surface width exceeds u16: {}", desc.width))
        })?;
        let h: u16 = desc.height.try_into().map_err(|_| {
            ViewError::render(format!("surface height exceeds u16: {}", desc.height))
        })?;

        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(desc.byte_len() as u64);
        Ok(vello_cpu::Pixmap::new(w, h))
    }

    pub(crate) fn release(&mut self, desc: SurfaceDesc, pixmap: vello_cpu::Pixmap) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bytes = desc.byte_len();
        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(desc).or_insert_with(|| Bucket {
            surfaces: Vec::new(),
        });
        if bucket.surfaces.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.surfaces.push(pixmap);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface_pool.rs"]
mod tests;
