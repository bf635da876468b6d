//! Terrain chunk streaming around a moving observer.
//!
//! [`GenerationQueue`] runs map and mesh jobs on background workers and hands
//! their results back on the consumer thread. [`ChunkStreamer`] owns the chunk
//! records and decides which chunks exist, which are visible, and which LOD
//! each one shows.

mod chunk;
mod error;
mod generator;
mod queue;
mod settings;
mod sink;
mod streamer;

pub use chunk::{ChunkBounds, ChunkCoord, ChunkState, LodMeshSlot, TerrainChunk};
pub use error::{JobError, SetupError};
pub use generator::TerrainGenerator;
pub use queue::{GenerationQueue, Submitter, default_worker_count};
pub use settings::{StreamSettings, lod_spec_from_config};
pub use sink::{NullSink, TerrainSink};
pub use streamer::{ChunkStreamer, StreamStats};
