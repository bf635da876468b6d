//! Distance-based LOD selection over an ordered threshold table.

use crate::error::LodSpecError;

/// One row of the LOD table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodLevel {
    /// Mesh decimation factor used inside this distance.
    pub lod: u8,
    /// Maximum edge distance at which this level is used.
    pub visible_distance: f32,
}

impl LodLevel {
    pub fn new(lod: u8, visible_distance: f32) -> Self {
        Self {
            lod,
            visible_distance,
        }
    }
}

/// Validated LOD table. Thresholds are strictly increasing; the last one is
/// the maximum view distance.
#[derive(Clone, Debug, PartialEq)]
pub struct LodSpec {
    levels: Vec<LodLevel>,
}

impl LodSpec {
    /// Validate and wrap a list of levels.
    ///
    /// # Errors
    ///
    /// Fails on an empty list, on non-finite or non-positive distances, and
    /// when distances are not strictly increasing.
    pub fn new(levels: Vec<LodLevel>) -> Result<Self, LodSpecError> {
        if levels.is_empty() {
            return Err(LodSpecError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            let distance = level.visible_distance;
            if !distance.is_finite() || distance <= 0.0 {
                return Err(LodSpecError::InvalidDistance { index, distance });
            }
            if index > 0 {
                let previous = levels[index - 1].visible_distance;
                if distance <= previous {
                    return Err(LodSpecError::NotIncreasing {
                        index,
                        distance,
                        previous,
                    });
                }
            }
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> LodLevel {
        self.levels[index]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Distance beyond which nothing is visible.
    pub fn max_view_distance(&self) -> f32 {
        self.levels[self.levels.len() - 1].visible_distance
    }

    /// Index of the finest level whose threshold is still `>= distance`.
    ///
    /// Returns `None` past the maximum view distance.
    pub fn select(&self, distance: f32) -> Option<usize> {
        debug_assert!(distance >= 0.0, "distance must be non-negative");
        self.levels
            .iter()
            .position(|level| distance <= level.visible_distance)
    }

    /// Check that every level's vertex step divides the chunk edge.
    ///
    /// `step_for` maps a LOD factor to the mesh vertex step.
    pub fn validate_for_grid(
        &self,
        edge: usize,
        step_for: impl Fn(u8) -> usize,
    ) -> Result<(), LodSpecError> {
        for level in &self.levels {
            let step = step_for(level.lod);
            if step == 0 || edge % step != 0 {
                return Err(LodSpecError::StepDoesNotDivide {
                    lod: level.lod,
                    step,
                    edge,
                });
            }
        }
        Ok(())
    }
}
