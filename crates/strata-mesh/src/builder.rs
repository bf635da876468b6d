//! Height grid tessellation with LOD decimation.
//!
//! LOD 0 keeps every grid cell. LOD `n > 0` keeps every `2n`-th cell, so a
//! 241-vertex edge (240 cells) decimates cleanly for every even step up to 12
//! and the border vertices of every LOD coincide with the full-resolution
//! border.

use strata_terrain::HeightGrid;

use crate::error::MeshError;
use crate::height_curve::HeightCurve;
use crate::mesh_data::MeshData;

/// LOD factors whose step divides the default 240-cell chunk edge.
pub const SUPPORTED_LODS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// Vertex step for a LOD factor.
pub fn mesh_step(lod: u8) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Tessellate `grid` into a triangle mesh.
///
/// Vertex `(x, y)` of the decimated lattice sits at
/// `(x - (w-1)/2, curve(h) * height_multiplier, y - (h-1)/2)` so the mesh is
/// centred on the chunk origin. Triangles wind with +Y facing normals.
///
/// # Errors
///
/// [`MeshError::GridTooSmall`] for grids under 2x2, and
/// [`MeshError::StepDoesNotDivide`] when the LOD step would miss the far edge.
pub fn build_terrain_mesh<C: HeightCurve + ?Sized>(
    grid: &HeightGrid,
    height_multiplier: f32,
    curve: &C,
    lod: u8,
) -> Result<MeshData, MeshError> {
    let (width, height) = (grid.width(), grid.height());
    if width < 2 || height < 2 {
        return Err(MeshError::GridTooSmall { width, height });
    }

    let step = mesh_step(lod);
    for edge in [width - 1, height - 1] {
        if edge % step != 0 {
            return Err(MeshError::StepDoesNotDivide { lod, step, edge });
        }
    }

    let vertices_per_line = (width - 1) / step + 1;
    let line_count = (height - 1) / step + 1;
    let top_left_x = (width - 1) as f32 / -2.0;
    let top_left_z = (height - 1) as f32 / -2.0;
    let (u_span, v_span) = ((width - 1) as f32, (height - 1) as f32);

    let mut mesh = MeshData::with_dimensions(lod, step, vertices_per_line, line_count);

    for gy in (0..height).step_by(step) {
        for gx in (0..width).step_by(step) {
            let y = curve.evaluate(grid.get(gx, gy)) * height_multiplier;
            mesh.push_vertex(
                [top_left_x + gx as f32, y, top_left_z + gy as f32],
                [gx as f32 / u_span, gy as f32 / v_span],
            );
        }
    }

    let vpl = vertices_per_line as u32;
    for row in 0..line_count as u32 - 1 {
        for col in 0..vpl - 1 {
            let i = row * vpl + col;
            mesh.push_triangle(i, i + vpl, i + vpl + 1);
            mesh.push_triangle(i + vpl + 1, i + 1, i);
        }
    }

    Ok(mesh)
}
