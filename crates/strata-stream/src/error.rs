//! Streaming error types.

use strata_lod::LodSpecError;
use strata_mesh::MeshError;
use strata_terrain::BiomeTableError;

/// Why a background job produced no result.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum JobError {
    #[error("mesh generation failed: {0}")]
    Mesh(#[from] MeshError),

    /// The job panicked; the payload message is kept when it is a string.
    #[error("generation job panicked: {0}")]
    Panicked(String),
}

/// Fatal configuration problems, reported before any generation starts.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("map chunk size {0} is too small, need at least 2")]
    ChunkSize(usize),

    #[error("invalid biome table: {0}")]
    Biomes(#[from] BiomeTableError),

    #[error("invalid LOD table: {0}")]
    Lod(#[from] LodSpecError),

    #[error("invalid height curve: {0}")]
    Curve(#[from] MeshError),
}
