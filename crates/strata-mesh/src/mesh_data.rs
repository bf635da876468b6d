//! Terrain mesh data produced by the tessellator for one (chunk, LOD) pair.

/// Vertex positions, UVs and triangle indices for one LOD of a chunk.
///
/// Vertices are laid out row-major, `vertices_per_line` per row and
/// `line_count` rows, centred on the chunk origin in the XZ plane with Y up.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    /// LOD factor this mesh was built at.
    pub lod: u8,
    /// Grid cells skipped between neighbouring vertices.
    pub step: usize,
    /// Vertices per row.
    pub vertices_per_line: usize,
    /// Number of rows.
    pub line_count: usize,
    /// Vertex positions `[x, y, z]` in chunk-local space.
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates in `[0, 1]`, matching the colour grid.
    pub uvs: Vec<[f32; 2]>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Creates an empty mesh with room for `vertices_per_line * line_count` vertices.
    pub fn with_dimensions(lod: u8, step: usize, vertices_per_line: usize, line_count: usize) -> Self {
        let vertices = vertices_per_line * line_count;
        let quads = vertices_per_line.saturating_sub(1) * line_count.saturating_sub(1);
        Self {
            lod,
            step,
            vertices_per_line,
            line_count,
            positions: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// Pushes a vertex and returns its index.
    pub fn push_vertex(&mut self, position: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.uvs.push(uv);
        index
    }

    /// Pushes a single triangle.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex at source-grid coordinate `(gx, gy)`, if this LOD kept it.
    pub fn vertex_at_grid(&self, gx: usize, gy: usize) -> Option<[f32; 3]> {
        if gx % self.step != 0 || gy % self.step != 0 {
            return None;
        }
        let (col, row) = (gx / self.step, gy / self.step);
        if col >= self.vertices_per_line || row >= self.line_count {
            return None;
        }
        Some(self.positions[row * self.vertices_per_line + col])
    }

    /// Perimeter vertices, clockwise from the first vertex: first row,
    /// last column, last row reversed, first column reversed. Corners appear once.
    pub fn border_vertices(&self) -> Vec<[f32; 3]> {
        let (w, h) = (self.vertices_per_line, self.line_count);
        if w == 0 || h == 0 {
            return Vec::new();
        }
        let at = |col: usize, row: usize| self.positions[row * w + col];

        let mut border = Vec::with_capacity(2 * (w + h));
        border.extend((0..w).map(|c| at(c, 0)));
        border.extend((1..h).map(|r| at(w - 1, r)));
        if h > 1 {
            border.extend((0..w - 1).rev().map(|c| at(c, h - 1)));
        }
        if w > 1 {
            border.extend((1..h - 1).rev().map(|r| at(0, r)));
        }
        border
    }

    /// Face normal of triangle `i` (unnormalised).
    pub fn triangle_normal(&self, i: usize) -> [f32; 3] {
        let idx = &self.indices[i * 3..i * 3 + 3];
        let [a, b, c] = [
            self.positions[idx[0] as usize],
            self.positions[idx[1] as usize],
            self.positions[idx[2] as usize],
        ];
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_mesh(w: usize, h: usize) -> MeshData {
        let mut mesh = MeshData::with_dimensions(0, 1, w, h);
        for y in 0..h {
            for x in 0..w {
                mesh.push_vertex([x as f32, 0.0, y as f32], [0.0, 0.0]);
            }
        }
        mesh
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshData::with_dimensions(0, 1, 0, 0);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.border_vertices().is_empty());
    }

    #[test]
    fn test_border_visits_perimeter_once() {
        let mesh = grid_mesh(4, 3);
        let border = mesh.border_vertices();
        assert_eq!(border.len(), 2 * (4 + 3) - 4);
        assert_eq!(border[0], [0.0, 0.0, 0.0]);
        assert_eq!(border[3], [3.0, 0.0, 0.0]);
        assert_eq!(border[5], [3.0, 0.0, 2.0]);
        assert_eq!(*border.last().unwrap(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_vertex_at_grid_respects_step() {
        let mut mesh = MeshData::with_dimensions(1, 2, 2, 2);
        for p in [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 2.0], [2.0, 0.0, 2.0]] {
            mesh.push_vertex(p, [0.0, 0.0]);
        }
        assert_eq!(mesh.vertex_at_grid(2, 2), Some([2.0, 0.0, 2.0]));
        assert_eq!(mesh.vertex_at_grid(1, 0), None);
        assert_eq!(mesh.vertex_at_grid(4, 0), None);
    }

    #[test]
    fn test_push_triangle() {
        let mut mesh = grid_mesh(2, 2);
        mesh.push_triangle(0, 2, 3);
        assert_eq!(mesh.triangle_count(), 1);
        // (0,0,0) -> (0,0,1) -> (1,0,1) faces +Y.
        assert!(mesh.triangle_normal(0)[1] > 0.0);
    }
}
