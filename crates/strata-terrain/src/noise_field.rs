//! Seeded multi-octave fractal noise sampled onto height grids.
//!
//! Composites octaves of Perlin noise, each at a seed-derived planar offset,
//! then rescales the accumulated values into `[0, 1]` either per grid (local)
//! or against the theoretical amplitude bound (global). Global normalisation
//! keeps independently generated neighbouring chunks continuous at their
//! shared edge.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::height_grid::HeightGrid;

/// Scale used in place of a non-positive or non-finite scale.
pub const MIN_SCALE: f32 = 0.0001;

/// Lacunarity used in place of a value `<= 1`.
pub const DEFAULT_LACUNARITY: f32 = 1.8;

/// Range of the per-octave random offsets.
const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

/// How accumulated noise is rescaled into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Rescale from the grid's observed `[min, max]`. Neighbouring chunks will
    /// not line up.
    Local,
    /// Rescale from `[-bound, bound]` where `bound` is the sum of octave amplitudes.
    #[default]
    Global,
}

/// Parameters for one noise generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// World units per noise unit at the first octave.
    pub scale: f32,
    /// Number of octaves. Zero yields an all-zero grid.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves, in `[0, 1]`.
    pub persistence: f32,
    /// Frequency multiplier between successive octaves, `> 1`.
    pub lacunarity: f32,
    /// Planar offset added to every sample position, in world units.
    pub offset: Vec2,
    /// Normalisation mode.
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 25.0,
            octaves: 5,
            persistence: 0.6,
            lacunarity: DEFAULT_LACUNARITY,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl NoiseParams {
    /// Return a copy with the cheaply correctable values coerced to safe ones:
    /// scale `<= 0` becomes [`MIN_SCALE`], lacunarity `<= 1` becomes
    /// [`DEFAULT_LACUNARITY`], and persistence is clamped to `[0, 1]`.
    pub fn sanitized(&self) -> Self {
        let mut params = self.clone();
        params.scale = coerce_scale(params.scale);
        if !(params.lacunarity > 1.0) {
            params.lacunarity = DEFAULT_LACUNARITY;
        }
        params.persistence = if params.persistence.is_nan() {
            0.0
        } else {
            params.persistence.clamp(0.0, 1.0)
        };
        params
    }
}

fn coerce_scale(scale: f32) -> f32 {
    if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        MIN_SCALE
    }
}

/// Deterministic fractal noise sampler.
///
/// Construction derives one random planar offset per octave from the seed, so
/// two fields built from equal parameters produce bit-identical grids.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    params: NoiseParams,
    octave_offsets: Vec<[f64; 2]>,
}

impl NoiseField {
    /// Create a field. A non-positive scale is coerced to [`MIN_SCALE`].
    pub fn new(params: NoiseParams) -> Self {
        let mut params = params;
        params.scale = coerce_scale(params.scale);

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let octave_offsets = (0..params.octaves)
            .map(|_| {
                [
                    rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                    rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE),
                ]
            })
            .collect();

        Self {
            perlin: Perlin::new(perlin_seed(params.seed)),
            params,
            octave_offsets,
        }
    }

    /// Return a reference to the (scale-coerced) parameters.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Sum of all octave amplitudes: the largest magnitude the raw
    /// accumulator can reach.
    pub fn max_possible_height(&self) -> f64 {
        let persistence = self.params.persistence as f64;
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.params.octaves {
            sum += amplitude;
            amplitude *= persistence;
        }
        sum
    }

    /// Raw (un-normalised) fractal value at a world position.
    pub fn sample_raw(&self, world_x: f64, world_y: f64) -> f64 {
        let scale = self.params.scale as f64;
        let lacunarity = self.params.lacunarity as f64;
        let persistence = self.params.persistence as f64;
        let offset_x = self.params.offset.x as f64;
        let offset_y = self.params.offset.y as f64;

        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total = 0.0;

        for octave in &self.octave_offsets {
            let sx = (world_x + offset_x + octave[0]) / scale * frequency;
            let sy = (world_y + offset_y + octave[1]) / scale * frequency;
            // Perlin output is already centred on zero; clamp guards the
            // global bound against slight overshoot.
            let value = self.perlin.get([sx, sy]).clamp(-1.0, 1.0);
            total += value * amplitude;

            amplitude *= persistence;
            frequency *= lacunarity;
        }

        total
    }

    /// Sample a `width x height` grid centred on `center` and normalise it.
    ///
    /// Cell `(x, y)` samples world position
    /// `center + (x - (width - 1) / 2, y - (height - 1) / 2)`, so grids whose
    /// centres are `width - 1` apart share their border row/column exactly.
    pub fn sample(&self, width: usize, height: usize, center: Vec2) -> HeightGrid {
        let mut grid = HeightGrid::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }

        let half_w = (width - 1) as f64 / 2.0;
        let half_h = (height - 1) as f64 / 2.0;
        let cx = center.x as f64;
        let cy = center.y as f64;

        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut raw = Vec::with_capacity(width * height);

        for y in 0..height {
            // World coordinate first: exact for integer centres, which keeps
            // shared borders bit-identical.
            let world_y = cy + (y as f64 - half_h);
            for x in 0..width {
                let world_x = cx + (x as f64 - half_w);
                let value = self.sample_raw(world_x, world_y);
                min = min.min(value);
                max = max.max(value);
                raw.push(value);
            }
        }

        let out = grid.values_mut();
        match self.params.normalize_mode {
            NormalizeMode::Local => {
                let range = max - min;
                for (dst, v) in out.iter_mut().zip(&raw) {
                    *dst = if range > 0.0 {
                        ((v - min) / range) as f32
                    } else {
                        0.0
                    };
                }
            }
            NormalizeMode::Global => {
                let bound = self.max_possible_height();
                for (dst, v) in out.iter_mut().zip(&raw) {
                    *dst = if bound > 0.0 {
                        ((v + bound) / (2.0 * bound)).clamp(0.0, 1.0) as f32
                    } else {
                        0.0
                    };
                }
            }
        }

        grid
    }
}

/// Fold both halves of the 64-bit seed into the permutation seed.
fn perlin_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Build a field from `params` and sample one grid centred on the origin
/// (plus `params.offset`).
pub fn generate_noise_map(width: usize, height: usize, params: &NoiseParams) -> HeightGrid {
    NoiseField::new(params.clone()).sample(width, height, Vec2::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(grid: &HeightGrid) -> Vec<u32> {
        grid.values().iter().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn test_determinism_same_seed_same_grid() {
        let params = NoiseParams {
            seed: 42,
            ..Default::default()
        };
        let a = NoiseField::new(params.clone()).sample(64, 64, Vec2::new(240.0, -480.0));
        let b = NoiseField::new(params).sample(64, 64, Vec2::new(240.0, -480.0));
        assert_eq!(bits(&a), bits(&b), "same inputs must give bit-identical grids");
    }

    #[test]
    fn test_high_seed_bits_change_permutation() {
        let low = 7u64;
        let high = low | (1 << 40);
        assert_eq!(perlin_seed(low), 7);
        assert_ne!(perlin_seed(low), perlin_seed(high));

        let a = Perlin::new(perlin_seed(low));
        let b = Perlin::new(perlin_seed(high));
        let differs = (0..16).any(|i| {
            let p = [i as f64 * 0.37 + 0.11, i as f64 * 0.53 + 0.29];
            a.get(p) != b.get(p)
        });
        assert!(differs);
    }

    #[test]
    fn test_different_seeds_produce_different_grids() {
        let a = generate_noise_map(
            32,
            32,
            &NoiseParams {
                seed: 1,
                ..Default::default()
            },
        );
        let b = generate_noise_map(
            32,
            32,
            &NoiseParams {
                seed: 999,
                ..Default::default()
            },
        );
        assert_ne!(bits(&a), bits(&b));
    }

    #[test]
    fn test_values_within_unit_range_both_modes() {
        for mode in [NormalizeMode::Local, NormalizeMode::Global] {
            let params = NoiseParams {
                seed: 7,
                normalize_mode: mode,
                ..Default::default()
            };
            let grid = NoiseField::new(params).sample(97, 53, Vec2::new(1000.0, 20.0));
            for &v in grid.values() {
                assert!((0.0..=1.0).contains(&v), "{mode:?} produced {v}");
            }
        }
    }

    #[test]
    fn test_local_mode_spans_full_range() {
        let params = NoiseParams {
            normalize_mode: NormalizeMode::Local,
            ..Default::default()
        };
        let grid = generate_noise_map(121, 121, &params);
        let (lo, hi) = grid.min_max().unwrap();
        assert_eq!(lo, 0.0);
        assert!((hi - 1.0).abs() < 1e-6, "local max should be 1, got {hi}");
    }

    #[test]
    fn test_global_mode_continuous_across_adjacent_chunks() {
        let size = 241;
        let edge = (size - 1) as f32;
        let field = NoiseField::new(NoiseParams {
            seed: 3,
            normalize_mode: NormalizeMode::Global,
            ..Default::default()
        });

        let left = field.sample(size, size, Vec2::new(0.0, 0.0));
        let right = field.sample(size, size, Vec2::new(edge, 0.0));
        for y in 0..size {
            assert_eq!(
                left.get(size - 1, y).to_bits(),
                right.get(0, y).to_bits(),
                "column mismatch at row {y}"
            );
        }

        let below = field.sample(size, size, Vec2::new(0.0, edge));
        for x in 0..size {
            assert_eq!(
                left.get(x, size - 1).to_bits(),
                below.get(x, 0).to_bits(),
                "row mismatch at column {x}"
            );
        }
    }

    #[test]
    fn test_zero_octaves_yields_zero_grid() {
        for mode in [NormalizeMode::Local, NormalizeMode::Global] {
            let grid = generate_noise_map(
                16,
                16,
                &NoiseParams {
                    octaves: 0,
                    normalize_mode: mode,
                    ..Default::default()
                },
            );
            assert!(grid.values().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_non_positive_scale_is_coerced() {
        let field = NoiseField::new(NoiseParams {
            scale: -3.0,
            ..Default::default()
        });
        assert_eq!(field.params().scale, MIN_SCALE);

        let grid = field.sample(8, 8, Vec2::ZERO);
        assert!(grid.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sanitized_coerces_lenient_values() {
        let params = NoiseParams {
            scale: 0.0,
            lacunarity: 0.5,
            persistence: 1.5,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.scale, MIN_SCALE);
        assert_eq!(params.lacunarity, DEFAULT_LACUNARITY);
        assert_eq!(params.persistence, 1.0);

        let untouched = NoiseParams::default();
        assert_eq!(untouched.sanitized(), untouched);
    }

    #[test]
    fn test_max_possible_height_is_geometric_sum() {
        let field = NoiseField::new(NoiseParams {
            octaves: 4,
            persistence: 0.5,
            ..Default::default()
        });
        assert!((field.max_possible_height() - 1.875).abs() < 1e-12);
    }

    #[test]
    fn test_raw_samples_bounded_by_max_height() {
        let field = NoiseField::new(NoiseParams::default());
        let bound = field.max_possible_height();
        for i in 0..500 {
            let v = field.sample_raw(i as f64 * 3.7, i as f64 * -1.3);
            assert!(v.abs() <= bound + 1e-9);
        }
    }

    #[test]
    fn test_offset_shifts_the_field() {
        let base = NoiseParams::default();
        let shifted = NoiseParams {
            offset: Vec2::new(10.0, 0.0),
            ..base.clone()
        };
        let a = NoiseField::new(base).sample(41, 41, Vec2::new(10.0, 0.0));
        let b = NoiseField::new(shifted).sample(41, 41, Vec2::ZERO);
        assert_eq!(bits(&a), bits(&b));
    }
}
