//! Row-major 2D grid of height samples.

/// A `width x height` grid of `f32` heights stored row-major (`y * width + x`).
///
/// After normalisation every value lies in `[0, 1]`. Each generation call
/// returns a fresh grid; grids are never shared mutably between threads.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightGrid {
    /// Create a zero-filled grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Wrap existing row-major values.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "height grid needs {width}x{height} values"
        );
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Height at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.values[y * self.width + x] = value;
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Smallest and largest value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.values.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
