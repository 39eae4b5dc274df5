//! Vertex cache simulation and miss-rate measurement.
//!
//! GPUs keep a small post-transform cache of recently shaded vertices;
//! triangle order decides how often it hits. [`vertex_cache_miss_rate`]
//! replays an index stream through a simulated FIFO cache and reports the
//! two standard figures of merit:
//!
//! - **ACMR** (average cache miss rate): misses per triangle. 3.0 is the
//!   worst case, values near 1.0 and below are well-ordered.
//! - **ATVR** (average transform to vertex ratio): transform invocations per
//!   referenced vertex. 1.0 is ideal (every vertex shaded exactly once).

use crate::error::{MeshError, Result};
use crate::mesh::{check_index_buffer, check_indices_in_range, used_faces, MeshIndex};

/// Result of a vertex cache replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheMetrics {
    /// Average cache misses per triangle.
    pub acmr: f32,
    /// Average transform invocations per referenced vertex.
    pub atvr: f32,
}

/// Simulated FIFO vertex cache. Tracks, per vertex, the fetch sequence
/// number of its last miss; a vertex is resident while fewer than
/// `cache_size` newer fetches have happened.
pub(crate) struct FifoCache {
    fetched_at: Vec<u64>,
    misses: u64,
    cache_size: u64,
}

impl FifoCache {
    const NEVER: u64 = u64::MAX;

    pub fn new(vertex_count: usize, cache_size: usize) -> Self {
        Self {
            fetched_at: vec![Self::NEVER; vertex_count],
            misses: 0,
            cache_size: cache_size as u64,
        }
    }

    /// Whether `v` is currently resident: the cache holds the last
    /// `cache_size` fetched vertices.
    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        let at = self.fetched_at[v];
        at != Self::NEVER && self.misses - at <= self.cache_size
    }

    /// Reference `v`, fetching it on a miss. Returns true on a miss.
    #[inline]
    pub fn fetch(&mut self, v: usize) -> bool {
        if self.contains(v) {
            return false;
        }
        self.fetched_at[v] = self.misses;
        self.misses += 1;
        true
    }

    /// Total misses so far.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Replay an index buffer through a simulated FIFO vertex cache of
/// `cache_size` entries and measure ACMR and ATVR.
///
/// Unused faces are skipped. Pure measurement: nothing is mutated.
///
/// # Example
/// ```
/// use meshprep::algo::optimize::vertex_cache_miss_rate;
///
/// // A single triangle: three cold misses.
/// let indices: Vec<u32> = vec![0, 1, 2];
/// let metrics = vertex_cache_miss_rate(&indices, 3, 16).unwrap();
/// assert_eq!(metrics.acmr, 3.0);
/// assert_eq!(metrics.atvr, 1.0);
/// ```
pub fn vertex_cache_miss_rate<I: MeshIndex>(
    indices: &[I],
    vertex_count: usize,
    cache_size: usize,
) -> Result<CacheMetrics> {
    check_index_buffer::<I>(indices, vertex_count)?;
    check_indices_in_range(indices, vertex_count)?;
    if cache_size == 0 {
        return Err(MeshError::invalid_param(
            "cache_size",
            cache_size,
            "must be non-zero",
        ));
    }

    let mut cache = FifoCache::new(vertex_count, cache_size);
    let mut referenced = vec![false; vertex_count];
    let mut face_total = 0u64;
    for (_, tri) in used_faces(indices) {
        face_total += 1;
        for idx in tri {
            let v = idx.to_usize();
            referenced[v] = true;
            cache.fetch(v);
        }
    }
    if face_total == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let referenced_total = referenced.iter().filter(|&&r| r).count() as u64;
    Ok(CacheMetrics {
        acmr: cache.misses() as f32 / face_total as f32,
        atvr: cache.misses() as f32 / referenced_total as f32,
    })
}
