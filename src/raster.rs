//! Biome grid → RGB raster, and PNG output.

use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::biomes::{color_for, BiomeColorTable};
use crate::error::RenderError;
use crate::sampler::BiomeGrid;

/// How a biome grid is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Edge length of the pixel block drawn for each cell
    pub pixels_per_cell: u32,
    /// Draw row 0 at the bottom of the image
    pub flip: bool,
    /// Darken the last pixel row/column of each cell block
    pub cell_outline: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            pixels_per_cell: 4,
            flip: true,
            cell_outline: false,
        }
    }
}

impl RasterOptions {
    /// Image dimensions for a grid of `width × height` cells.
    pub fn image_size(&self, width: usize, height: usize) -> (u32, u32) {
        (
            self.pixels_per_cell.saturating_mul(width as u32),
            self.pixels_per_cell.saturating_mul(height as u32),
        )
    }
}

/// Outcome of writing a tile file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Another writer created the file first; it was left untouched.
    AlreadyPresent,
}

/// Rasterise `grid` with `table`, expanding each cell to a pixel block.
pub fn rasterize(
    grid: &BiomeGrid,
    table: &BiomeColorTable,
    options: &RasterOptions,
) -> Result<RgbImage, RenderError> {
    let (width, height) = options.image_size(grid.width, grid.height);
    let len = width as usize * height as usize * 3;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| RenderError::Allocation { width, height })?;
    buf.resize(len, 0);

    let ppc = options.pixels_per_cell as usize;
    let row_stride = width as usize * 3;
    for (cx, cz, &id) in grid.iter() {
        let fill = color_for(table, id);
        let edge = darken(fill);
        let row = if options.flip {
            grid.height - 1 - cz
        } else {
            cz
        };
        for py in 0..ppc {
            let line = (row * ppc + py) * row_stride;
            for px in 0..ppc {
                let on_edge = px == ppc - 1 || py == ppc - 1;
                let color = if options.cell_outline && ppc > 1 && on_edge {
                    edge
                } else {
                    fill
                };
                let at = line + (cx * ppc + px) * 3;
                buf[at..at + 3].copy_from_slice(&color);
            }
        }
    }

    RgbImage::from_raw(width, height, buf)
        .ok_or(RenderError::Allocation { width, height })
}

fn darken(color: [u8; 3]) -> [u8; 3] {
    color.map(|c| (c as u16 * 3 / 4) as u8)
}

/// Encode `image` as PNG at `path` without ever exposing a partial file.
///
/// The image is written to a temporary file in the destination directory and then
/// renamed into place. An existing file at `path` is never replaced.
pub fn write_png(path: &Path, image: &RgbImage) -> Result<WriteOutcome, RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        PngEncoder::new(&mut writer).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(WriteOutcome::Written),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(WriteOutcome::AlreadyPresent),
        Err(e) => Err(RenderError::Io(e.error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::{biome_color_table, Biome, FALLBACK_COLOR};
    use crate::tilemap::Tilemap;
    use tempfile::tempdir;

    fn two_by_two() -> BiomeGrid {
        let mut grid = Tilemap::try_new_with(2, 2, Biome::Plains.id()).unwrap();
        for (x, y, cell) in grid.iter_mut() {
            *cell = match (x, y) {
                (1, 0) => Biome::Desert.id(),
                (0, 1) => 999,
                (1, 1) => -4,
                _ => Biome::Plains.id(),
            };
        }
        grid
    }

    #[test]
    fn test_cells_expand_to_blocks() {
        let table = biome_color_table();
        let options = RasterOptions {
            pixels_per_cell: 3,
            flip: false,
            cell_outline: false,
        };
        let img = rasterize(&two_by_two(), &table, &options).unwrap();
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(img.get_pixel(0, 0).0, Biome::Plains.color());
        assert_eq!(img.get_pixel(2, 2).0, Biome::Plains.color());
        assert_eq!(img.get_pixel(3, 0).0, Biome::Desert.color());
        assert_eq!(img.get_pixel(5, 2).0, Biome::Desert.color());
    }

    #[test]
    fn test_unknown_ids_use_fallback() {
        let table = biome_color_table();
        let options = RasterOptions {
            pixels_per_cell: 1,
            flip: false,
            cell_outline: false,
        };
        let img = rasterize(&two_by_two(), &table, &options).unwrap();
        assert_eq!(img.get_pixel(0, 1).0, FALLBACK_COLOR);
        assert_eq!(img.get_pixel(1, 1).0, FALLBACK_COLOR);
    }

    #[test]
    fn test_flip_puts_first_row_at_bottom() {
        let table = biome_color_table();
        let options = RasterOptions {
            pixels_per_cell: 1,
            flip: true,
            cell_outline: false,
        };
        let img = rasterize(&two_by_two(), &table, &options).unwrap();
        assert_eq!(img.get_pixel(1, 1).0, Biome::Desert.color());
        assert_eq!(img.get_pixel(0, 0).0, FALLBACK_COLOR);
    }

    #[test]
    fn test_cell_outline_darkens_block_edges() {
        let table = biome_color_table();
        let options = RasterOptions {
            pixels_per_cell: 4,
            flip: false,
            cell_outline: true,
        };
        let img = rasterize(&two_by_two(), &table, &options).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, Biome::Plains.color());
        assert_eq!(img.get_pixel(3, 0).0, darken(Biome::Plains.color()));
        assert_eq!(img.get_pixel(0, 3).0, darken(Biome::Plains.color()));
    }

    #[test]
    fn test_write_png_round_trip_and_no_clobber() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.png");
        let table = biome_color_table();
        let img = rasterize(&two_by_two(), &table, &RasterOptions::default()).unwrap();

        assert_eq!(write_png(&path, &img).unwrap(), WriteOutcome::Written);
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 8));
        let len = std::fs::metadata(&path).unwrap().len();

        let other = RgbImage::new(1, 1);
        assert_eq!(write_png(&path, &other).unwrap(), WriteOutcome::AlreadyPresent);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len);

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
