//! Single-tile rendering: sample, rasterise, write.
//!
//! Every failure here is contained to the tile. A failed tile is logged and left
//! absent so a later run picks it up again.

use std::path::PathBuf;

use crate::biomes::{biome_color_table, BiomeColorTable};
use crate::coords::TileRegion;
use crate::error::RenderError;
use crate::progress::ProgressTracker;
use crate::raster::{rasterize, write_png, RasterOptions, WriteOutcome};
use crate::sampler::WorldSampler;
use crate::storage::{ensure_dir, tile_exists};
use crate::worker::ZoomLevelJob;

/// What happened to one tile.
#[derive(Debug)]
pub enum TileOutcome {
    /// Newly written to the given path
    Rendered(PathBuf),
    /// Already on disk; no sampling or encoding done
    Cached(PathBuf),
    /// Not written; the tile stays absent
    Failed(RenderError),
}

/// Turns biome grids into tile files. Holds the colour table for its lifetime.
pub struct TileRenderer {
    table: BiomeColorTable,
    options: RasterOptions,
}

impl TileRenderer {
    pub fn new(options: RasterOptions) -> Self {
        Self {
            table: biome_color_table(),
            options,
        }
    }

    /// Render tile `(tile_x, tile_y)` of `job` and count it in `progress`.
    pub fn render_tile<S: WorldSampler + ?Sized>(
        &self,
        job: &ZoomLevelJob,
        tile_x: i32,
        tile_y: i32,
        sampler: &mut S,
        progress: &ProgressTracker,
    ) -> TileOutcome {
        let outcome = self.produce(job, tile_x, tile_y, sampler);
        match &outcome {
            TileOutcome::Rendered(path) => {
                log::debug!(
                    "Tile {}_{} at zoom level {} saved to {}",
                    tile_x,
                    tile_y,
                    job.zoom_level,
                    path.display()
                );
            }
            TileOutcome::Cached(path) => {
                log::debug!("Tile {} already present, skipping", path.display());
            }
            TileOutcome::Failed(e) => {
                log::warn!(
                    "Failed tile {}_{} at zoom level {}: {}",
                    tile_x,
                    tile_y,
                    job.zoom_level,
                    e
                );
            }
        }
        progress.record_completion();
        outcome
    }

    fn produce<S: WorldSampler + ?Sized>(
        &self,
        job: &ZoomLevelJob,
        tile_x: i32,
        tile_y: i32,
        sampler: &mut S,
    ) -> TileOutcome {
        let region = TileRegion::for_tile(tile_x, tile_y, job.tile_size, job.scale);
        let path = job.tile_path(tile_x, tile_y);
        if tile_exists(&path) {
            return TileOutcome::Cached(path);
        }

        let grid = match sampler.sample_biomes(&region) {
            Ok(grid) => grid,
            Err(e) => return TileOutcome::Failed(e.into()),
        };
        let image = match rasterize(&grid, &self.table, &self.options) {
            Ok(image) => image,
            Err(e) => return TileOutcome::Failed(e),
        };

        let dir = job.tile_dir(tile_x);
        if let Err(source) = ensure_dir(&dir) {
            return TileOutcome::Failed(RenderError::Directory { path: dir, source });
        }

        match write_png(&path, &image) {
            Ok(WriteOutcome::Written) => TileOutcome::Rendered(path),
            Ok(WriteOutcome::AlreadyPresent) => TileOutcome::Cached(path),
            Err(e) => TileOutcome::Failed(e),
        }
    }
}
