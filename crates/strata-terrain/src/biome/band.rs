//! Biome band record.

/// Index of a band within its [`super::BiomeTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

/// One height band of the classification table.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeBand {
    /// Human-readable biome name (e.g., "shallow_water").
    pub name: String,
    /// Inclusive upper height bound of this band, in `[0, 1]`.
    pub threshold: f32,
    /// RGBA display colour written into the colour grid.
    pub color: [u8; 4],
}

impl BiomeBand {
    pub fn new(name: impl Into<String>, threshold: f32, color: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            threshold,
            color,
        }
    }
}
