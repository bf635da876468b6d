//! Level-of-detail management: distance thresholds and LOD selection.

mod error;
mod selector;

pub use error::LodSpecError;
pub use selector::{LodLevel, LodSpec};
