//! Per-chunk records owned by the streamer.

use std::sync::Arc;

use glam::Vec2;
use strata_mesh::MeshData;
use strata_terrain::MapData;

/// Integer position of a chunk on the infinite chunk grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk whose centre is nearest to `position`.
    pub fn from_world(position: Vec2, chunk_edge: f32) -> Self {
        let cell = (position / chunk_edge).round();
        Self::new(cell.x as i32, cell.y as i32)
    }

    /// World-space centre of this chunk.
    pub fn center(self, chunk_edge: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * chunk_edge
    }
}

/// Axis-aligned square covered by a chunk in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl ChunkBounds {
    pub fn from_center(center: Vec2, edge: f32) -> Self {
        let half = Vec2::splat(edge * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Distance from `point` to the nearest point of the square; zero inside.
    pub fn distance_to(&self, point: Vec2) -> f32 {
        point.clamp(self.min, self.max).distance(point)
    }
}

/// Map-data lifecycle of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// No map data and no request in flight.
    Unloaded,
    MapRequested,
    MapReady,
}

/// Cache slot for one LOD level's mesh. Filled at most once.
#[derive(Clone, Debug, Default)]
pub enum LodMeshSlot {
    #[default]
    Empty,
    Requested,
    Ready(Arc<MeshData>),
}

impl LodMeshSlot {
    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        match self {
            Self::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested)
    }
}

/// One tile of the infinite terrain. Created on first reference and kept for
/// the rest of the session.
#[derive(Clone, Debug)]
pub struct TerrainChunk {
    pub(crate) coord: ChunkCoord,
    pub(crate) bounds: ChunkBounds,
    pub(crate) state: ChunkState,
    pub(crate) map_data: Option<Arc<MapData>>,
    pub(crate) lod_meshes: Vec<LodMeshSlot>,
    /// LOD index whose mesh is active.
    pub(crate) current_lod: Option<usize>,
    /// LOD index chosen by the last distance evaluation.
    pub(crate) desired_lod: Option<usize>,
    pub(crate) visible: bool,
}

impl TerrainChunk {
    pub(crate) fn new(coord: ChunkCoord, chunk_edge: f32, lod_count: usize) -> Self {
        Self {
            coord,
            bounds: ChunkBounds::from_center(coord.center(chunk_edge), chunk_edge),
            state: ChunkState::Unloaded,
            map_data: None,
            lod_meshes: vec![LodMeshSlot::Empty; lod_count],
            current_lod: None,
            desired_lod: None,
            visible: false,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn map_data(&self) -> Option<&Arc<MapData>> {
        self.map_data.as_ref()
    }

    pub fn lod_slots(&self) -> &[LodMeshSlot] {
        &self.lod_meshes
    }

    pub fn current_lod(&self) -> Option<usize> {
        self.current_lod
    }

    pub fn desired_lod(&self) -> Option<usize> {
        self.desired_lod
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Mesh currently shown for this chunk.
    pub fn active_mesh(&self) -> Option<&Arc<MeshData>> {
        self.current_lod
            .and_then(|index| self.lod_meshes[index].mesh())
    }

    pub fn cached_mesh_count(&self) -> usize {
        self.lod_meshes.iter().filter(|slot| slot.mesh().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_rounding() {
        assert_eq!(ChunkCoord::from_world(Vec2::ZERO, 240.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(Vec2::new(119.0, -119.0), 240.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(Vec2::new(121.0, -121.0), 240.0), ChunkCoord::new(1, -1));
        assert_eq!(ChunkCoord::from_world(Vec2::new(-500.0, 730.0), 240.0), ChunkCoord::new(-2, 3));
    }

    #[test]
    fn test_bounds_cover_chunk() {
        let bounds = ChunkBounds::from_center(ChunkCoord::new(1, -1).center(240.0), 240.0);
        assert_eq!(bounds.min, Vec2::new(120.0, -360.0));
        assert_eq!(bounds.max, Vec2::new(360.0, -120.0));
        assert_eq!(bounds.center(), Vec2::new(240.0, -240.0));
    }

    #[test]
    fn test_distance_to_bounds() {
        let bounds = ChunkBounds::from_center(Vec2::ZERO, 240.0);
        assert_eq!(bounds.distance_to(Vec2::new(50.0, -30.0)), 0.0);
        assert_eq!(bounds.distance_to(Vec2::new(219.0, 0.0)), 99.0);
        assert_eq!(bounds.distance_to(Vec2::new(0.0, -270.0)), 150.0);
        assert_eq!(bounds.distance_to(Vec2::new(420.0, 520.0)), 500.0);
    }

    #[test]
    fn test_new_chunk_is_unloaded() {
        let chunk = TerrainChunk::new(ChunkCoord::new(2, 3), 240.0, 3);
        assert_eq!(chunk.state(), ChunkState::Unloaded);
        assert_eq!(chunk.lod_slots().len(), 3);
        assert!(chunk.active_mesh().is_none());
        assert!(!chunk.is_visible());
        assert_eq!(chunk.bounds().center(), Vec2::new(480.0, 720.0));
    }
}
