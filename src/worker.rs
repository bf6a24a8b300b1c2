//! Zoom-level jobs and the worker that renders one of them end to end.

use std::path::{Path, PathBuf};

use crate::progress::ProgressTracker;
use crate::render::{TileOutcome, TileRenderer};
use crate::sampler::{SamplerSettings, WorldSampler};
use crate::spiral::SpiralOrder;
use crate::storage;

/// Tiles between batch-progress log lines.
pub const BATCH_LOG_INTERVAL: u64 = 100;

/// Everything one worker needs to render a zoom level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoomLevelJob {
    pub seed: u64,
    pub output_dir: PathBuf,
    pub zoom_level: u32,
    /// World blocks per sample cell
    pub scale: u32,
    /// Tile edge in sample cells
    pub tile_size: u32,
    pub tiles_per_side: u32,
    /// Tile coordinate at grid position 0 on both axes
    pub origin: i32,
}

impl ZoomLevelJob {
    pub fn new<P: AsRef<Path>>(
        seed: u64,
        output_dir: P,
        zoom_level: u32,
        scale: u32,
        tile_size: u32,
        tiles_per_side: u32,
    ) -> Self {
        Self {
            seed,
            output_dir: output_dir.as_ref().to_path_buf(),
            zoom_level,
            scale,
            tile_size,
            tiles_per_side,
            origin: 0,
        }
    }

    /// Shift the grid so that grid position 0 maps to tile `origin`.
    pub fn with_origin(mut self, origin: i32) -> Self {
        self.origin = origin;
        self
    }

    pub fn tile_count(&self) -> u64 {
        self.tiles_per_side as u64 * self.tiles_per_side as u64
    }

    /// Tile coordinate for a grid position.
    pub fn tile_at(&self, grid_x: u32, grid_y: u32) -> (i32, i32) {
        (self.origin + grid_x as i32, self.origin + grid_y as i32)
    }

    pub fn tile_path(&self, tile_x: i32, tile_y: i32) -> PathBuf {
        storage::tile_path(&self.output_dir, self.seed, self.zoom_level, tile_x, tile_y)
    }

    pub fn tile_dir(&self, tile_x: i32) -> PathBuf {
        storage::tile_dir(&self.output_dir, self.seed, self.zoom_level, tile_x)
    }
}

/// Per-job tally, returned when a worker finishes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub zoom_level: u32,
    pub rendered: u64,
    pub cached: u64,
    pub failed: u64,
}

impl WorkerReport {
    pub fn visited(&self) -> u64 {
        self.rendered + self.cached + self.failed
    }

    pub fn record(&mut self, outcome: &TileOutcome) {
        match outcome {
            TileOutcome::Rendered(_) => self.rendered += 1,
            TileOutcome::Cached(_) => self.cached += 1,
            TileOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &WorkerReport) {
        self.rendered += other.rendered;
        self.cached += other.cached;
        self.failed += other.failed;
    }
}

/// Render every tile of `job` in spiral order with one sampler.
///
/// The sampler is configured and seeded once; it does not change between tiles
/// of the same job.
pub fn run_zoom_level<S: WorldSampler + ?Sized>(
    job: &ZoomLevelJob,
    settings: &SamplerSettings,
    sampler: &mut S,
    renderer: &TileRenderer,
    progress: &ProgressTracker,
) -> WorkerReport {
    settings.apply(sampler, job.seed);

    let mut report = WorkerReport {
        zoom_level: job.zoom_level,
        ..Default::default()
    };
    let total = job.tile_count();

    for (grid_x, grid_y) in SpiralOrder::in_range(job.tiles_per_side) {
        let (tile_x, tile_y) = job.tile_at(grid_x, grid_y);
        let outcome = renderer.render_tile(job, tile_x, tile_y, sampler, progress);
        report.record(&outcome);

        let visited = report.visited();
        if visited % BATCH_LOG_INTERVAL == 0 && visited < total {
            progress.log_locked(&format!(
                "Zoom level {}: {}/{} tiles done ({} rendered, {} cached, {} failed)",
                job.zoom_level, visited, total, report.rendered, report.cached, report.failed
            ));
        }
    }

    progress.log_locked(&format!(
        "Zoom level {} finished: {} rendered, {} cached, {} failed",
        job.zoom_level, report.rendered, report.cached, report.failed
    ));
    report
}
