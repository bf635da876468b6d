//! Mesh builder error types.

/// Errors raised by mesh construction and curve setup.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshError {
    /// The LOD vertex step does not evenly divide the grid edge, so border
    /// vertices would not land on the original grid boundary.
    #[error("LOD {lod} uses vertex step {step}, which does not divide grid edge {edge}")]
    StepDoesNotDivide { lod: u8, step: usize, edge: usize },

    /// A mesh needs at least a 2x2 grid.
    #[error("height grid {width}x{height} is too small to tessellate")]
    GridTooSmall { width: usize, height: usize },

    /// A keyframe curve needs at least one key.
    #[error("height curve has no keyframes")]
    EmptyCurve,

    /// A keyframe time or value is NaN or infinite.
    #[error("height curve keyframe ({time}, {value}) is not finite")]
    NonFiniteKey { time: f32, value: f32 },
}
