//! Procedural terrain data: seeded fractal noise, falloff masks, biome bands,
//! and the per-chunk map data pipeline.

mod falloff;
mod height_grid;
mod map_data;
mod noise_field;
mod preview;

pub mod biome;

pub use biome::{BiomeBand, BiomeId, BiomeTable, BiomeTableError};
pub use falloff::{FalloffMask, FalloffShape, radial_curve, square_curve};
pub use height_grid::HeightGrid;
pub use map_data::{MapData, MapDataBuilder, build_map_data};
pub use noise_field::{
    DEFAULT_LACUNARITY, MIN_SCALE, NoiseField, NoiseParams, NormalizeMode, generate_noise_map,
};
pub use preview::ColorTexture;
