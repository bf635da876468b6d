/// Problems with a LOD threshold table.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LodSpecError {
    #[error("LOD spec must have at least one level")]
    Empty,

    #[error("LOD level {index} has invalid visible distance {distance}")]
    InvalidDistance { index: usize, distance: f32 },

    #[error(
        "LOD level {index} distance {distance} is not greater than the previous level's {previous}"
    )]
    NotIncreasing {
        index: usize,
        distance: f32,
        previous: f32,
    },

    #[error("LOD factor {lod} uses vertex step {step}, which does not divide chunk edge {edge}")]
    StepDoesNotDivide { lod: u8, step: usize, edge: usize },
}
