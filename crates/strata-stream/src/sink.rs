//! Hand-off points for finished terrain artifacts.

use std::sync::Arc;

use strata_mesh::MeshData;
use strata_terrain::MapData;

use crate::chunk::ChunkCoord;

/// Receives finished artifacts from the streamer on the consumer thread.
///
/// A renderer uploads textures and meshes here; the streamer never reads
/// anything back. All methods default to doing nothing.
pub trait TerrainSink {
    /// Map data for `coord` is ready, e.g. to build its colour texture.
    fn map_ready(&mut self, _coord: ChunkCoord, _data: &MapData) {}

    /// The active mesh of `coord` switched to LOD table entry `lod_index`.
    fn mesh_ready(&mut self, _coord: ChunkCoord, _lod_index: usize, _mesh: &Arc<MeshData>) {}

    fn visibility_changed(&mut self, _coord: ChunkCoord, _visible: bool) {}
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TerrainSink for NullSink {}
