//! Biome classification: an ordered table of height bands.
//!
//! A biome is a flat record (threshold, id, colour). Classification picks the
//! first band whose threshold is not exceeded by the height.

mod band;
mod table;

pub use band::{BiomeBand, BiomeId};
pub use table::{BiomeTable, BiomeTableError};
