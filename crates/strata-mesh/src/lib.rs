//! Height-grid tessellation: LOD-decimated terrain meshes with seam-preserving
//! borders and externally supplied height curves.

pub mod builder;
pub mod error;
pub mod height_curve;
pub mod mesh_data;

pub use builder::{SUPPORTED_LODS, build_terrain_mesh, mesh_step};
pub use error::MeshError;
pub use height_curve::{HeightCurve, KeyframeCurve, LinearCurve};
pub use mesh_data::MeshData;
