//! Run configuration and pyramid level tables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::coords::TileSizePolicy;
use crate::error::PipelineError;
use crate::raster::RasterOptions;
use crate::sampler::SamplerSettings;
use crate::worker::ZoomLevelJob;

/// Viewport covered by `generate-single`, in sample cells.
pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1240;

/// Sampling scale used by `generate-single`.
pub const SINGLE_LEVEL_SCALE: u32 = 4;

/// One level of a tile pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PyramidLevel {
    pub zoom: u32,
    pub tiles_per_side: u32,
    /// World blocks per sample cell
    pub scale: u32,
    /// Tile edge in cells for this level
    pub tile_size: u32,
}

impl PyramidLevel {
    pub fn tile_count(&self) -> u64 {
        self.tiles_per_side as u64 * self.tiles_per_side as u64
    }

    pub fn job<P: AsRef<Path>>(&self, seed: u64, output_dir: P) -> ZoomLevelJob {
        ZoomLevelJob::new(
            seed,
            output_dir,
            self.zoom,
            self.scale,
            self.tile_size,
            self.tiles_per_side,
        )
    }
}

/// Built-in pyramid: four levels covering the same 8192-block square.
pub fn default_pyramid() -> Vec<PyramidLevel> {
    vec![
        PyramidLevel {
            zoom: 0,
            tiles_per_side: 8,
            scale: 16,
            tile_size: 64,
        },
        PyramidLevel {
            zoom: 1,
            tiles_per_side: 16,
            scale: 8,
            tile_size: 64,
        },
        PyramidLevel {
            zoom: 2,
            tiles_per_side: 32,
            scale: 4,
            tile_size: 64,
        },
        PyramidLevel {
            zoom: 3,
            tiles_per_side: 32,
            scale: 1,
            tile_size: 256,
        },
    ]
}

/// Check a level table before any work starts.
pub fn validate_levels(levels: &[PyramidLevel]) -> Result<(), PipelineError> {
    if levels.is_empty() {
        return Err(PipelineError::InvalidArgument("level table is empty".into()));
    }
    for level in levels {
        if level.scale == 0 || level.tile_size == 0 {
            return Err(PipelineError::InvalidArgument(format!(
                "zoom level {} needs a positive scale and tile size",
                level.zoom
            )));
        }
        if levels.iter().filter(|l| l.zoom == level.zoom).count() > 1 {
            return Err(PipelineError::InvalidArgument(format!(
                "zoom level {} listed more than once",
                level.zoom
            )));
        }
    }
    Ok(())
}

/// Read a JSON array of `PyramidLevel`s.
pub fn load_levels(path: &Path) -> Result<Vec<PyramidLevel>, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::LevelFile {
        path: path.to_path_buf(),
        source,
    })?;
    let levels: Vec<PyramidLevel> = serde_json::from_str(&text)?;
    validate_levels(&levels)?;
    Ok(levels)
}

/// Settings shared by every command.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub output_root: PathBuf,
    /// Concurrent zoom-level workers (0 = one per CPU)
    pub workers: usize,
    pub raster: RasterOptions,
    pub sampler: SamplerSettings,
    pub tile_size: TileSizePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("tiles"),
            workers: 0,
            raster: RasterOptions::default(),
            sampler: SamplerSettings::default(),
            tile_size: TileSizePolicy::default(),
        }
    }
}
