//! RGBA preview textures built from colour and height grids.

use crate::height_grid::HeightGrid;
use crate::map_data::MapData;

/// A 2D texture stored as row-major RGBA8 pixels.
///
/// This is what the core hands to a display sink; uploading it is the
/// renderer's job.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTexture {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl ColorTexture {
    /// Build a texture from per-cell colours.
    ///
    /// # Panics
    ///
    /// Panics if `colors.len() != width * height`.
    pub fn from_color_grid(colors: &[[u8; 4]], width: u32, height: u32) -> Self {
        assert_eq!(
            colors.len(),
            (width * height) as usize,
            "colour grid does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels: colors.iter().flatten().copied().collect(),
        }
    }

    /// Greyscale texture: height 0 is black, 1 is white.
    pub fn from_height_grid(grid: &HeightGrid) -> Self {
        let pixels = grid
            .values()
            .iter()
            .flat_map(|&h| {
                let v = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
                [v, v, v, 255]
            })
            .collect();
        Self {
            width: grid.width() as u32,
            height: grid.height() as u32,
            pixels,
        }
    }

    /// Biome colour texture for a chunk.
    pub fn from_map_data(data: &MapData) -> Self {
        let size = data.size() as u32;
        Self::from_color_grid(&data.colors, size, size)
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Count the number of unique colors (ignoring alpha) in the texture.
    pub fn unique_color_count(&self) -> usize {
        let mut colors = std::collections::HashSet::new();
        for chunk in self.pixels.chunks_exact(4) {
            colors.insert((chunk[0], chunk[1], chunk[2]));
        }
        colors.len()
    }

    /// Encode as an 8-bit RGBA PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut png_buf = Vec::new();
        {
            let mut encoder =
                png::Encoder::new(std::io::Cursor::new(&mut png_buf), self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(png_buf)
    }
}
