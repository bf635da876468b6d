//! Observer-driven chunk streaming.
//!
//! Each tick the streamer drains finished generation jobs, and when the
//! observer has moved far enough it rescans the square of chunks around it.
//! Chunks enter view by requesting map data; once the map is ready each
//! evaluation picks a LOD from the edge distance to the observer and requests
//! that mesh if it is not cached. Chunks that leave view are hidden but kept.

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use strata_lod::LodSpec;
use strata_mesh::{MeshData, mesh_step};
use strata_terrain::MapData;
use tracing::{debug, info, trace, warn};

use crate::chunk::{ChunkCoord, ChunkState, LodMeshSlot, TerrainChunk};
use crate::error::{JobError, SetupError};
use crate::generator::TerrainGenerator;
use crate::queue::{GenerationQueue, Submitter};
use crate::settings::StreamSettings;
use crate::sink::TerrainSink;

/// Counters describing the streamer's current state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks created so far (never removed).
    pub chunks_known: usize,
    pub chunks_visible: usize,
    pub maps_ready: usize,
    pub meshes_cached: usize,
    /// Jobs whose callbacks have not run yet.
    pub jobs_in_flight: usize,
    pub map_requests: usize,
    pub mesh_requests: usize,
    pub failed_jobs: usize,
    /// Visible-set rescans performed.
    pub scans: usize,
}

/// Everything the job callbacks mutate. Lives on the consumer thread.
pub(crate) struct StreamState<K> {
    submitter: Submitter<StreamState<K>>,
    generator: Arc<TerrainGenerator>,
    lod: LodSpec,
    chunk_edge: f32,
    /// Rings of chunks scanned around the observer's chunk.
    chunks_in_view: i32,
    chunks: FxHashMap<ChunkCoord, TerrainChunk>,
    visible: FxHashSet<ChunkCoord>,
    observer: Vec2,
    last_scan_position: Option<Vec2>,
    move_threshold_sq: f32,
    sink: K,
    map_requests: usize,
    mesh_requests: usize,
    failed_jobs: usize,
    scans: usize,
}

/// Owns the chunk records and drives their generation.
///
/// Call [`ChunkStreamer::update`] once per tick from the thread that owns it.
pub struct ChunkStreamer<K> {
    state: StreamState<K>,
    queue: GenerationQueue<StreamState<K>>,
}

impl<K: TerrainSink + 'static> ChunkStreamer<K> {
    /// Create a streamer and its worker pool.
    ///
    /// # Errors
    ///
    /// Fails when the map chunk size is below 2 or when a LOD level's vertex
    /// step does not divide the chunk edge.
    pub fn new(
        generator: Arc<TerrainGenerator>,
        lod: LodSpec,
        settings: StreamSettings,
        sink: K,
    ) -> Result<Self, SetupError> {
        let size = generator.map_chunk_size();
        if size < 2 {
            return Err(SetupError::ChunkSize(size));
        }
        let chunk_edge = generator.chunk_world_size();
        lod.validate_for_grid(size - 1, mesh_step)?;

        let chunks_in_view = rings_in_view(lod.max_view_distance(), chunk_edge);
        let queue = GenerationQueue::new(settings.worker_threads);

        info!(
            chunk_edge,
            chunks_in_view,
            max_view_distance = lod.max_view_distance(),
            workers = queue.worker_count(),
            "chunk streamer ready"
        );

        let state = StreamState {
            submitter: queue.submitter(),
            generator,
            lod,
            chunk_edge,
            chunks_in_view,
            chunks: FxHashMap::default(),
            visible: FxHashSet::default(),
            observer: Vec2::ZERO,
            last_scan_position: None,
            move_threshold_sq: settings.viewer_move_threshold * settings.viewer_move_threshold,
            sink,
            map_requests: 0,
            mesh_requests: 0,
            failed_jobs: 0,
            scans: 0,
        };

        Ok(Self { state, queue })
    }

    /// Advance one tick with the observer at `observer`.
    ///
    /// Runs finished job callbacks, then rescans the visible set on the first
    /// call and whenever the observer has moved past the move threshold since
    /// the last scan.
    pub fn update(&mut self, observer: Vec2) {
        self.state.observer = observer;
        self.queue.drain_once(&mut self.state);

        let rescan = match self.state.last_scan_position {
            None => true,
            Some(last) => last.distance_squared(observer) > self.state.move_threshold_sq,
        };
        if rescan {
            self.state.last_scan_position = Some(observer);
            self.state.scan();
        }
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.state.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.state.chunks.values()
    }

    /// Coordinates of visible chunks, sorted.
    pub fn visible_chunks(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.state.visible.iter().copied().collect();
        coords.sort_unstable();
        coords
    }

    pub fn observer(&self) -> Vec2 {
        self.state.observer
    }

    pub fn lod_spec(&self) -> &LodSpec {
        &self.state.lod
    }

    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.state.generator
    }

    pub fn chunks_in_view(&self) -> i32 {
        self.state.chunks_in_view
    }

    pub fn stats(&self) -> StreamStats {
        let chunks = self.state.chunks.values();
        StreamStats {
            chunks_known: self.state.chunks.len(),
            chunks_visible: self.state.visible.len(),
            maps_ready: chunks
                .clone()
                .filter(|c| c.state == ChunkState::MapReady)
                .count(),
            meshes_cached: chunks.map(TerrainChunk::cached_mesh_count).sum(),
            jobs_in_flight: self.queue.in_flight_count(),
            map_requests: self.state.map_requests,
            mesh_requests: self.state.mesh_requests,
            failed_jobs: self.state.failed_jobs,
            scans: self.state.scans,
        }
    }

    pub fn sink(&self) -> &K {
        &self.state.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.state.sink
    }
}

/// Rings of chunks to scan so that every chunk within `max_view_distance`
/// of an observer anywhere in the centre chunk is reached.
///
/// The observer can sit up to half an edge off the centre chunk's middle, so
/// ring `r` is at least `(r - 1) * edge` away.
fn rings_in_view(max_view_distance: f32, chunk_edge: f32) -> i32 {
    (max_view_distance / chunk_edge).floor() as i32 + 1
}

impl<K: TerrainSink + 'static> StreamState<K> {
    fn scan(&mut self) {
        self.scans += 1;
        let previous = std::mem::take(&mut self.visible);
        let center = ChunkCoord::from_world(self.observer, self.chunk_edge);
        let rings = self.chunks_in_view;

        for dy in -rings..=rings {
            for dx in -rings..=rings {
                let coord =
                    ChunkCoord::new(center.x.saturating_add(dx), center.y.saturating_add(dy));
                match self.chunks.get(&coord).map(|chunk| chunk.state) {
                    Some(ChunkState::MapReady) => self.update_chunk(coord),
                    Some(ChunkState::MapRequested) => {}
                    Some(ChunkState::Unloaded) | None => self.request_map(coord),
                }
            }
        }

        let hidden: Vec<_> = previous
            .into_iter()
            .filter(|coord| !self.visible.contains(coord))
            .collect();
        for coord in hidden {
            self.set_visible(coord, false);
        }

        trace!(
            observer = ?self.observer,
            center = ?center,
            visible = self.visible.len(),
            known = self.chunks.len(),
            "visible set rescanned"
        );
    }

    /// Pick the LOD for a chunk with map data and request or assign its mesh.
    fn update_chunk(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.state != ChunkState::MapReady {
            return;
        }

        let distance = chunk.bounds.distance_to(self.observer);
        let Some(index) = self.lod.select(distance) else {
            chunk.desired_lod = None;
            self.set_visible(coord, false);
            return;
        };
        chunk.desired_lod = Some(index);

        if chunk.current_lod != Some(index) {
            match &chunk.lod_meshes[index] {
                LodMeshSlot::Ready(mesh) => {
                    let mesh = Arc::clone(mesh);
                    chunk.current_lod = Some(index);
                    debug!(?coord, lod_index = index, "active mesh switched");
                    self.sink.mesh_ready(coord, index, &mesh);
                }
                LodMeshSlot::Requested => {}
                LodMeshSlot::Empty => {
                    if let Some(map) = chunk.map_data.clone() {
                        chunk.lod_meshes[index] = LodMeshSlot::Requested;
                        let lod = self.lod.level(index).lod;
                        self.request_mesh(coord, index, lod, map);
                    }
                }
            }
        }

        self.set_visible(coord, true);
    }

    fn request_map(&mut self, coord: ChunkCoord) {
        let (edge, lod_count) = (self.chunk_edge, self.lod.len());
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| TerrainChunk::new(coord, edge, lod_count));
        chunk.state = ChunkState::MapRequested;
        let center = chunk.bounds.center();

        self.map_requests += 1;
        debug!(?coord, "map data requested");

        let generator = Arc::clone(&self.generator);
        self.submitter.submit(
            move || Ok(generator.generate_map_data(center)),
            move |state: &mut Self, result| state.on_map_ready(coord, result),
        );
    }

    fn request_mesh(&mut self, coord: ChunkCoord, index: usize, lod: u8, map: Arc<MapData>) {
        self.mesh_requests += 1;
        debug!(?coord, lod_index = index, lod, "mesh requested");

        let generator = Arc::clone(&self.generator);
        self.submitter.submit(
            move || Ok(generator.generate_mesh(&map, lod)?),
            move |state: &mut Self, result| state.on_mesh_ready(coord, index, result),
        );
    }

    fn on_map_ready(&mut self, coord: ChunkCoord, result: Result<MapData, JobError>) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        match result {
            Ok(data) => {
                let data = Arc::new(data);
                chunk.map_data = Some(Arc::clone(&data));
                chunk.state = ChunkState::MapReady;
                debug!(?coord, "map data ready");
                self.sink.map_ready(coord, &data);
                self.update_chunk(coord);
            }
            Err(err) => {
                chunk.state = ChunkState::Unloaded;
                self.failed_jobs += 1;
                warn!(?coord, error = %err, "map generation failed");
            }
        }
    }

    fn on_mesh_ready(&mut self, coord: ChunkCoord, index: usize, result: Result<MeshData, JobError>) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        match result {
            Ok(mesh) => {
                chunk.lod_meshes[index] = LodMeshSlot::Ready(Arc::new(mesh));
                debug!(?coord, lod_index = index, "mesh cached");
                self.update_chunk(coord);
            }
            Err(err) => {
                chunk.lod_meshes[index] = LodMeshSlot::Empty;
                self.failed_jobs += 1;
                warn!(?coord, lod_index = index, error = %err, "mesh generation failed");
            }
        }
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if visible {
            self.visible.insert(coord);
        } else {
            self.visible.remove(&coord);
        }
        if chunk.visible != visible {
            chunk.visible = visible;
            self.sink.visibility_changed(coord, visible);
        }
    }
}

#[cfg(test)]
#[path = "streamer_tests.rs"]
mod tests;
