//! Standalone preview of the chunk under the origin.

use std::path::Path;

use glam::Vec2;
use strata_config::DrawMode;
use strata_mesh::MeshError;
use strata_stream::TerrainGenerator;
use strata_terrain::ColorTexture;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("failed to build preview mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("failed to encode preview PNG: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("failed to write preview {}: {source}", path.display())]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Texture for the origin chunk in the requested draw mode.
///
/// `Mesh` also tessellates the chunk at `preview_lod` and logs its size; the
/// texture is the biome colour map the mesh would be shaded with.
pub fn preview_texture(
    generator: &TerrainGenerator,
    mode: DrawMode,
    preview_lod: u8,
) -> Result<ColorTexture, PreviewError> {
    let data = generator.generate_map_data(Vec2::ZERO);
    let texture = match mode {
        DrawMode::NoiseMap => ColorTexture::from_height_grid(&data.heights),
        DrawMode::ColorMap => ColorTexture::from_map_data(&data),
        DrawMode::Mesh => {
            let mesh = generator.generate_mesh(&data, preview_lod)?;
            info!(
                lod = preview_lod,
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                "preview mesh built"
            );
            ColorTexture::from_map_data(&data)
        }
    };
    Ok(texture)
}

/// Render the preview and write it to `path` as PNG.
pub fn write_preview(
    generator: &TerrainGenerator,
    mode: DrawMode,
    preview_lod: u8,
    path: &Path,
) -> Result<(), PreviewError> {
    let bytes = preview_texture(generator, mode, preview_lod)?.to_png()?;
    std::fs::write(path, bytes).map_err(|source| PreviewError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), ?mode, "preview written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::Config;

    fn generator() -> TerrainGenerator {
        let mut config = Config::default();
        config.mesh.map_chunk_size = 49;
        config.noise.octaves = 3;
        TerrainGenerator::from_config(&config).unwrap()
    }

    #[test]
    fn test_noise_map_is_greyscale() {
        let texture = preview_texture(&generator(), DrawMode::NoiseMap, 0).unwrap();
        assert_eq!(texture.dimensions(), (49, 49));
        let [r, g, b, a] = texture.pixel(10, 20);
        assert_eq!((r, r), (g, b));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_color_map_uses_biome_colors() {
        let generator = generator();
        let texture = preview_texture(&generator, DrawMode::ColorMap, 0).unwrap();
        let data = generator.generate_map_data(Vec2::ZERO);
        assert_eq!(texture.pixel(5, 7), data.color_at(5, 7));
    }

    #[test]
    fn test_mesh_mode_checks_lod() {
        // 48 % 10 != 0
        assert!(matches!(
            preview_texture(&generator(), DrawMode::Mesh, 5),
            Err(PreviewError::Mesh(MeshError::StepDoesNotDivide { .. }))
        ));
        assert!(preview_texture(&generator(), DrawMode::Mesh, 4).is_ok());
    }

    #[test]
    fn test_write_preview_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("origin.png");
        write_preview(&generator(), DrawMode::ColorMap, 0, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
