//! Precomputed falloff masks that taper heights toward a chunk's edges.
//!
//! The map pipeline subtracts the mask from the height grid, turning each
//! chunk into an island surrounded by low terrain.

/// Falloff profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FalloffShape {
    /// Chebyshev distance from the centre; square coastline.
    #[default]
    Square,
    /// Euclidean distance from the centre; round coastline with a sharp edge.
    Radial,
}

const SQUARE_A: f32 = 3.0;
const SQUARE_B: f32 = 2.2;
const RADIAL_A: f32 = 20.0;
const RADIAL_B: f32 = 1.5;

/// Square-profile curve `v^a / (v^a + (b - b*v)^a)` with `a = 3`, `b = 2.2`.
///
/// Maps `0 -> 0` and `1 -> 1` with a steep rise near the edge.
pub fn square_curve(value: f32) -> f32 {
    let value = value.clamp(0.0, 1.0);
    let near = value.powf(SQUARE_A);
    let far = (SQUARE_B - SQUARE_B * value).powf(SQUARE_A);
    near / (near + far)
}

/// Radial curve `alpha^-a / (alpha^-a + (b - b*alpha)^-a)` with `a = 20`, `b = 1.5`,
/// where `alpha = 1 - distance`.
///
/// Evaluated in the equivalent form `1 / (1 + (alpha / (b - b*alpha))^a)`,
/// which is finite at both ends: `alpha = 1` (centre) gives 0 and
/// `alpha = 0` gives 1. The drop happens around `alpha = b / (1 + b)`.
pub fn radial_curve(alpha: f32) -> f32 {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        return 0.0;
    }
    let ratio = alpha / (RADIAL_B - RADIAL_B * alpha);
    1.0 / (1.0 + ratio.powf(RADIAL_A))
}

/// A square grid of attenuation values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FalloffMask {
    size: usize,
    shape: FalloffShape,
    values: Vec<f32>,
}

impl FalloffMask {
    /// Precompute a `size x size` mask.
    pub fn generate(size: usize, shape: FalloffShape) -> Self {
        let mut values = Vec::with_capacity(size * size);
        let extent = size as f32;
        let center = extent / 2.0;

        for y in 0..size {
            for x in 0..size {
                let value = match shape {
                    FalloffShape::Square => {
                        let nx = x as f32 / extent * 2.0 - 1.0;
                        let ny = y as f32 / extent * 2.0 - 1.0;
                        square_curve(nx.abs().max(ny.abs()))
                    }
                    FalloffShape::Radial => {
                        let distance = (x as f32 - center).hypot(y as f32 - center);
                        let alpha = (1.0 - distance / extent).clamp(0.0, 1.0);
                        radial_curve(alpha)
                    }
                };
                values.push(value);
            }
        }

        Self {
            size,
            shape,
            values,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shape(&self) -> FalloffShape {
        self.shape
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
