//! Streaming settings and LOD table conversion from configuration.

use strata_config::{LodConfig, StreamingConfig};
use strata_lod::{LodLevel, LodSpec};
use strata_mesh::mesh_step;
use tracing::warn;

use crate::error::SetupError;
use crate::queue::default_worker_count;

const DEFAULT_MOVE_THRESHOLD: f32 = 25.0;

/// Runtime knobs for [`ChunkStreamer`](crate::ChunkStreamer).
#[derive(Clone, Debug, PartialEq)]
pub struct StreamSettings {
    /// Distance the observer must move before the visible set is rescanned.
    pub viewer_move_threshold: f32,
    /// Background generation threads.
    pub worker_threads: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            viewer_move_threshold: DEFAULT_MOVE_THRESHOLD,
            worker_threads: default_worker_count(),
        }
    }
}

impl StreamSettings {
    /// Convert configuration, replacing unusable values with defaults.
    pub fn from_config(config: &StreamingConfig) -> Self {
        let mut settings = Self::default();

        let threshold = config.viewer_move_threshold;
        if threshold >= 0.0 && threshold.is_finite() {
            settings.viewer_move_threshold = threshold;
        } else {
            warn!(
                configured = threshold,
                used = DEFAULT_MOVE_THRESHOLD,
                "viewer move threshold must be non-negative"
            );
        }

        if config.worker_threads > 0 {
            settings.worker_threads = config.worker_threads as usize;
        }
        settings
    }
}

/// Validate the configured LOD table against a chunk edge of `chunk_edge` cells.
pub fn lod_spec_from_config(config: &LodConfig, chunk_edge: usize) -> Result<LodSpec, SetupError> {
    let levels = config
        .levels
        .iter()
        .map(|level| LodLevel::new(level.lod, level.visible_distance))
        .collect();
    let spec = LodSpec::new(levels)?;
    spec.validate_for_grid(chunk_edge, mesh_step)?;
    Ok(spec)
}
