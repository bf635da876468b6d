//! Per-chunk map data: noise, optional falloff, and biome classification.

use glam::Vec2;

use crate::biome::{BiomeId, BiomeTable};
use crate::falloff::{FalloffMask, FalloffShape};
use crate::height_grid::HeightGrid;
use crate::noise_field::{NoiseField, NoiseParams};

/// Generated data for one chunk. Immutable once built; mesh jobs for every
/// LOD of the chunk share it behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct MapData {
    /// World-space centre the grid was sampled around.
    pub center: Vec2,
    /// Normalised heights in `[0, 1]`.
    pub heights: HeightGrid,
    /// Biome id per cell, parallel to `heights`.
    pub biomes: Vec<BiomeId>,
    /// RGBA colour per cell, parallel to `heights`.
    pub colors: Vec<[u8; 4]>,
}

impl MapData {
    /// Edge length of the (square) grid.
    pub fn size(&self) -> usize {
        self.heights.width()
    }

    pub fn biome_at(&self, x: usize, y: usize) -> BiomeId {
        self.biomes[y * self.heights.width() + x]
    }

    pub fn color_at(&self, x: usize, y: usize) -> [u8; 4] {
        self.colors[y * self.heights.width() + x]
    }
}

/// Builds [`MapData`] for chunks of a fixed size.
///
/// Holds no mutable state, so one builder can be shared by every worker thread.
#[derive(Clone, Debug)]
pub struct MapDataBuilder {
    size: usize,
    noise: NoiseField,
    falloff: Option<FalloffMask>,
    biomes: BiomeTable,
}

impl MapDataBuilder {
    /// Create a builder for `size x size` chunks. The falloff mask, if any, is
    /// precomputed once here.
    pub fn new(
        size: usize,
        params: NoiseParams,
        falloff: Option<FalloffShape>,
        biomes: BiomeTable,
    ) -> Self {
        Self {
            size,
            noise: NoiseField::new(params),
            falloff: falloff.map(|shape| FalloffMask::generate(size, shape)),
            biomes,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn falloff(&self) -> Option<&FalloffMask> {
        self.falloff.as_ref()
    }

    pub fn biomes(&self) -> &BiomeTable {
        &self.biomes
    }

    /// Generate the chunk centred on `center`.
    pub fn build(&self, center: Vec2) -> MapData {
        let mut heights = self.noise.sample(self.size, self.size, center);

        if let Some(mask) = &self.falloff {
            for (h, m) in heights.values_mut().iter_mut().zip(mask.values()) {
                *h = (*h - m).clamp(0.0, 1.0);
            }
        }

        let cells = heights.values().len();
        let mut biomes = Vec::with_capacity(cells);
        let mut colors = Vec::with_capacity(cells);
        for &h in heights.values() {
            let id = self.biomes.classify_id(h);
            biomes.push(id);
            colors.push(self.biomes.band(id).color);
        }

        MapData {
            center,
            heights,
            biomes,
            colors,
        }
    }
}

/// One-shot map data generation without a long-lived builder.
pub fn build_map_data(
    center: Vec2,
    size: usize,
    params: &NoiseParams,
    falloff: Option<FalloffShape>,
    biomes: &BiomeTable,
) -> MapData {
    MapDataBuilder::new(size, params.clone(), falloff, biomes.clone()).build(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::NormalizeMode;

    fn builder(falloff: Option<FalloffShape>) -> MapDataBuilder {
        MapDataBuilder::new(
            61,
            NoiseParams {
                seed: 11,
                ..Default::default()
            },
            falloff,
            BiomeTable::default_bands(),
        )
    }

    #[test]
    fn test_grids_are_parallel() {
        let data = builder(None).build(Vec2::ZERO);
        assert_eq!(data.size(), 61);
        assert_eq!(data.biomes.len(), 61 * 61);
        assert_eq!(data.colors.len(), 61 * 61);
    }

    #[test]
    fn test_colors_match_classification() {
        let data = builder(None).build(Vec2::new(60.0, 0.0));
        let table = BiomeTable::default_bands();
        for y in 0..data.size() {
            for x in 0..data.size() {
                let h = data.heights.get(x, y);
                assert_eq!(data.biome_at(x, y), table.classify_id(h));
                assert_eq!(data.color_at(x, y), table.classify(h).color);
            }
        }
    }

    #[test]
    fn test_falloff_lowers_and_clamps() {
        let plain = builder(None).build(Vec2::ZERO);
        let island = builder(Some(FalloffShape::Square)).build(Vec2::ZERO);

        for (a, b) in plain.heights.values().iter().zip(island.heights.values()) {
            assert!(b <= a);
            assert!((0.0..=1.0).contains(b));
        }
        // Square mask is 1 along the first column.
        for y in 0..island.size() {
            assert_eq!(island.heights.get(0, y), 0.0);
        }
    }

    #[test]
    fn test_build_is_pure() {
        let b = builder(Some(FalloffShape::Radial));
        assert_eq!(b.build(Vec2::new(120.0, 240.0)), b.build(Vec2::new(120.0, 240.0)));
    }

    #[test]
    fn test_one_shot_matches_builder() {
        let params = NoiseParams {
            seed: 11,
            normalize_mode: NormalizeMode::Local,
            ..Default::default()
        };
        let table = BiomeTable::default_bands();
        let a = build_map_data(Vec2::ZERO, 33, &params, None, &table);
        let b = MapDataBuilder::new(33, params, None, table).build(Vec2::ZERO);
        assert_eq!(a, b);
    }

    #[test]
    fn test_center_recorded() {
        let data = builder(None).build(Vec2::new(-240.0, 480.0));
        assert_eq!(data.center, Vec2::new(-240.0, 480.0));
    }
}
