//! Height remapping curves applied to normalised heights before scaling.

use crate::error::MeshError;

/// A pure `f32 -> f32` remapping, shared read-only by every mesh job.
pub trait HeightCurve: Send + Sync {
    fn evaluate(&self, t: f32) -> f32;
}

impl<F> HeightCurve for F
where
    F: Fn(f32) -> f32 + Send + Sync,
{
    fn evaluate(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Identity curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearCurve;

impl HeightCurve for LinearCurve {
    fn evaluate(&self, t: f32) -> f32 {
        t
    }
}

/// Piecewise-linear curve through `(time, value)` keyframes.
///
/// Inputs before the first key or after the last key clamp to that key's value.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeCurve {
    keys: Vec<(f32, f32)>,
}

impl KeyframeCurve {
    /// Build a curve; keys are sorted by time.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptyCurve`] for no keys and
    /// [`MeshError::NonFiniteKey`] for NaN or infinite components.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Result<Self, MeshError> {
        if keys.is_empty() {
            return Err(MeshError::EmptyCurve);
        }
        if let Some(&(time, value)) = keys
            .iter()
            .find(|(t, v)| !t.is_finite() || !v.is_finite())
        {
            return Err(MeshError::NonFiniteKey { time, value });
        }
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Whether values never decrease as time increases.
    pub fn is_monotonic(&self) -> bool {
        self.keys.windows(2).all(|w| w[1].1 >= w[0].1)
    }
}

impl HeightCurve for KeyframeCurve {
    fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        // First key strictly after t; the one before it is <= t.
        let upper = self.keys.partition_point(|&(time, _)| time <= t);
        let (t0, v0) = self.keys[upper - 1];
        let (t1, v1) = self.keys[upper];
        let span = t1 - t0;
        if span <= 0.0 {
            return v1;
        }
        v0 + (v1 - v0) * ((t - t0) / span)
    }
}
