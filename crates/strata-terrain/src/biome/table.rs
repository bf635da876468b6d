//! Validated biome band table with O(log n) classification.

use super::{BiomeBand, BiomeId};

/// Configuration errors for a band table. All are fatal: the table is
/// rejected before any generation starts.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BiomeTableError {
    /// The table has no bands.
    #[error("biome table is empty")]
    Empty,

    /// A threshold is NaN or infinite.
    #[error("biome band '{name}' has a non-finite threshold")]
    NonFinite { name: String },

    /// A threshold lies below zero.
    #[error("biome band '{name}' threshold {threshold} is below 0")]
    Negative { name: String, threshold: f32 },

    /// Thresholds are not strictly ascending, so two bands overlap.
    #[error("biome band '{name}' threshold {threshold} overlaps the previous band ({previous})")]
    Overlap {
        name: String,
        threshold: f32,
        previous: f32,
    },

    /// The last band stops short of 1.0, leaving a gap at the top.
    #[error("biome bands only cover heights up to {covered}, expected 1.0")]
    Gap { covered: f32 },

    /// More bands than a [`BiomeId`] can index.
    #[error("biome table has {0} bands, at most {max} are supported", max = u16::MAX)]
    TooMany(usize),
}

/// Ordered band table partitioning `[0, 1]`.
///
/// Band `i` covers `(threshold[i-1], threshold[i]]`; the first band also
/// covers 0. Construction guarantees there are no gaps or overlaps.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeTable {
    bands: Vec<BiomeBand>,
}

impl BiomeTable {
    /// Validate and build a table.
    ///
    /// # Errors
    ///
    /// Returns a [`BiomeTableError`] if the bands are empty, unsorted,
    /// non-finite, negative, or do not reach 1.0.
    pub fn new(bands: Vec<BiomeBand>) -> Result<Self, BiomeTableError> {
        if bands.is_empty() {
            return Err(BiomeTableError::Empty);
        }
        if bands.len() > u16::MAX as usize {
            return Err(BiomeTableError::TooMany(bands.len()));
        }

        let mut previous: Option<f32> = None;
        for band in &bands {
            if !band.threshold.is_finite() {
                return Err(BiomeTableError::NonFinite {
                    name: band.name.clone(),
                });
            }
            if band.threshold < 0.0 {
                return Err(BiomeTableError::Negative {
                    name: band.name.clone(),
                    threshold: band.threshold,
                });
            }
            if let Some(prev) = previous
                && band.threshold <= prev
            {
                return Err(BiomeTableError::Overlap {
                    name: band.name.clone(),
                    threshold: band.threshold,
                    previous: prev,
                });
            }
            previous = Some(band.threshold);
        }

        let covered = bands[bands.len() - 1].threshold;
        if covered < 1.0 {
            return Err(BiomeTableError::Gap { covered });
        }

        Ok(Self { bands })
    }

    /// The eight-band water/sand/grass/rock/snow table.
    pub fn default_bands() -> Self {
        let bands = vec![
            BiomeBand::new("deep_water", 0.3, [40, 64, 160, 255]),
            BiomeBand::new("shallow_water", 0.43, [56, 96, 200, 255]),
            BiomeBand::new("sand", 0.45, [210, 208, 125, 255]),
            BiomeBand::new("grass", 0.55, [86, 152, 23, 255]),
            BiomeBand::new("forest", 0.7, [62, 107, 18, 255]),
            BiomeBand::new("rock", 0.8, [90, 69, 60, 255]),
            BiomeBand::new("high_rock", 0.9, [75, 60, 53, 255]),
            BiomeBand::new("snow", 1.0, [255, 255, 255, 255]),
        ];
        Self { bands }
    }

    /// Band id for a height. Heights are clamped to `[0, 1]`; NaN maps to 0.
    pub fn classify_id(&self, height: f32) -> BiomeId {
        let height = if height.is_nan() {
            0.0
        } else {
            height.clamp(0.0, 1.0)
        };
        let index = self.bands.partition_point(|band| band.threshold < height);
        // The last threshold is >= 1.0, so `index` is always in range.
        BiomeId(index.min(self.bands.len() - 1) as u16)
    }

    /// Band for a height.
    pub fn classify(&self, height: f32) -> &BiomeBand {
        self.band(self.classify_id(height))
    }

    /// Returns the band for the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn band(&self, id: BiomeId) -> &BiomeBand {
        &self.bands[id.0 as usize]
    }

    pub fn bands(&self) -> &[BiomeBand] {
        &self.bands
    }

    /// Looks up a band id by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.bands
            .iter()
            .position(|band| band.name == name)
            .map(|i| BiomeId(i as u16))
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl Default for BiomeTable {
    fn default() -> Self {
        Self::default_bands()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn band(name: &str, threshold: f32) -> BiomeBand {
        BiomeBand::new(name, threshold, [0, 0, 0, 255])
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = BiomeTable::default_bands();
        assert_eq!(
            BiomeTable::new(table.bands().to_vec()).as_ref(),
            Ok(&table)
        );
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_every_height_selects_exactly_one_band() {
        let table = BiomeTable::default_bands();
        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);

        for _ in 0..10_000 {
            let h: f32 = rng.random_range(0.0..=1.0);
            let matching: Vec<usize> = table
                .bands()
                .iter()
                .enumerate()
                .filter(|(i, b)| {
                    let lower = if *i == 0 {
                        f32::NEG_INFINITY
                    } else {
                        table.bands()[i - 1].threshold
                    };
                    h > lower && h <= b.threshold
                })
                .map(|(i, _)| i)
                .collect();
            assert_eq!(matching.len(), 1, "height {h} matched {matching:?}");
            assert_eq!(table.classify_id(h), BiomeId(matching[0] as u16));
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let table = BiomeTable::default_bands();
        assert_eq!(table.classify(0.3).name, "deep_water");
        assert_eq!(table.classify(0.3001).name, "shallow_water");
        assert_eq!(table.classify(0.0).name, "deep_water");
        assert_eq!(table.classify(1.0).name, "snow");
    }

    #[test]
    fn test_out_of_range_heights_clamp() {
        let table = BiomeTable::default_bands();
        assert_eq!(table.classify(-0.5).name, "deep_water");
        assert_eq!(table.classify(7.0).name, "snow");
        assert_eq!(table.classify(f32::NAN).name, "deep_water");
    }

    #[test]
    fn test_empty_table_rejected() {
        assert_eq!(BiomeTable::new(Vec::new()), Err(BiomeTableError::Empty));
    }

    #[test]
    fn test_gap_at_top_rejected() {
        let err = BiomeTable::new(vec![band("a", 0.5), band("b", 0.9)]).unwrap_err();
        assert_eq!(err, BiomeTableError::Gap { covered: 0.9 });
    }

    #[test]
    fn test_overlap_rejected() {
        let err = BiomeTable::new(vec![band("a", 0.5), band("b", 0.5), band("c", 1.0)]).unwrap_err();
        assert!(matches!(err, BiomeTableError::Overlap { ref name, .. } if name == "b"));

        let err = BiomeTable::new(vec![band("a", 0.7), band("b", 0.2), band("c", 1.0)]).unwrap_err();
        assert!(matches!(err, BiomeTableError::Overlap { .. }));
    }

    #[test]
    fn test_non_finite_and_negative_rejected() {
        assert!(matches!(
            BiomeTable::new(vec![band("a", f32::NAN), band("b", 1.0)]),
            Err(BiomeTableError::NonFinite { .. })
        ));
        assert!(matches!(
            BiomeTable::new(vec![band("a", -0.1), band("b", 1.0)]),
            Err(BiomeTableError::Negative { .. })
        ));
    }

    #[test]
    fn test_lookup_by_name() {
        let table = BiomeTable::default_bands();
        assert_eq!(table.lookup_by_name("sand"), Some(BiomeId(2)));
        assert_eq!(table.lookup_by_name("lava"), None);
    }
}
