//! The three entry points: one zoom level, a whole pyramid, or one tile.

use crate::config::{
    validate_levels, PipelineConfig, PyramidLevel, SINGLE_LEVEL_SCALE, VIEWPORT_HEIGHT,
    VIEWPORT_WIDTH,
};
use crate::coords::viewport_grid;
use crate::error::{PipelineError, RenderError};
use crate::progress::{ProgressSnapshot, ProgressTracker};
use crate::render::{TileOutcome, TileRenderer};
use crate::sampler::WorldSampler;
use crate::scheduler::JobScheduler;
use crate::storage::TileStorage;
use crate::worker::{WorkerReport, ZoomLevelJob};

/// Result of a multi-tile run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub levels: Vec<WorkerReport>,
    pub progress: ProgressSnapshot,
}

impl RunSummary {
    /// Counts summed over every level.
    pub fn totals(&self) -> WorkerReport {
        let mut totals = WorkerReport::default();
        for level in &self.levels {
            totals.merge(level);
        }
        totals
    }
}

fn prepare_output(config: &PipelineConfig) -> Result<TileStorage, PipelineError> {
    let storage = TileStorage::new(&config.output_root);
    storage.prepare().map_err(|source| PipelineError::Setup {
        path: storage.root().to_path_buf(),
        source,
    })?;
    Ok(storage)
}

/// Run `jobs` on the worker pool and wait for all of them.
pub fn run_jobs<F, S>(
    config: &PipelineConfig,
    jobs: Vec<ZoomLevelJob>,
    make_sampler: F,
) -> Result<RunSummary, PipelineError>
where
    F: Fn() -> S + Sync,
    S: WorldSampler,
{
    let storage = prepare_output(config)?;

    let renderer = TileRenderer::new(config.raster);
    let mut scheduler =
        JobScheduler::new(config.workers, make_sampler, config.sampler, renderer)?;
    for job in jobs {
        match storage.list_tiles(job.seed, job.zoom_level) {
            Ok(present) if !present.is_empty() => log::info!(
                "Zoom level {}: {} tiles already on disk",
                job.zoom_level,
                present.len()
            ),
            Ok(_) => {}
            Err(e) => log::warn!(
                "Could not list existing tiles for zoom level {}: {}",
                job.zoom_level,
                e
            ),
        }
        scheduler.submit(job);
    }
    log::info!(
        "{} zoom level jobs queued, {} tiles in total",
        scheduler.queued_jobs(),
        scheduler.queued_tiles()
    );

    let progress = ProgressTracker::new(scheduler.queued_tiles());
    let levels = scheduler.await_all(&progress);
    let summary = RunSummary {
        levels,
        progress: progress.snapshot(),
    };

    let totals = summary.totals();
    log::info!(
        "Done: {} rendered, {} cached, {} failed in {:.1}s",
        totals.rendered,
        totals.cached,
        totals.failed,
        summary.progress.elapsed.as_secs_f64()
    );
    Ok(summary)
}

/// Render the centred viewport grid for one zoom level.
pub fn generate_single<F, S>(
    config: &PipelineConfig,
    seed: u64,
    zoom: u32,
    make_sampler: F,
) -> Result<RunSummary, PipelineError>
where
    F: Fn() -> S + Sync,
    S: WorldSampler,
{
    let tile_size = config.tile_size.tile_size(zoom)?;
    let grid = viewport_grid(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, tile_size)?;
    let (first, last) = grid.tile_range();
    log::info!(
        "Zoom level {}: tile size {}, tiles {}..={} on both axes",
        zoom,
        tile_size,
        first,
        last
    );

    let job = ZoomLevelJob::new(
        seed,
        &config.output_root,
        zoom,
        SINGLE_LEVEL_SCALE,
        tile_size,
        grid.side,
    )
    .with_origin(grid.origin);
    run_jobs(config, vec![job], make_sampler)
}

/// Render every level of a pyramid, levels in parallel.
pub fn generate_pyramid<F, S>(
    config: &PipelineConfig,
    seed: u64,
    levels: &[PyramidLevel],
    make_sampler: F,
) -> Result<RunSummary, PipelineError>
where
    F: Fn() -> S + Sync,
    S: WorldSampler,
{
    validate_levels(levels)?;
    let jobs = levels
        .iter()
        .map(|level| level.job(seed, &config.output_root))
        .collect();
    run_jobs(config, jobs, make_sampler)
}

/// Render exactly one tile.
///
/// A tile directory that cannot be created aborts the run; any other tile
/// failure is returned as `TileOutcome::Failed`.
pub fn generate_tile<S: WorldSampler + ?Sized>(
    config: &PipelineConfig,
    seed: u64,
    tile_x: i32,
    tile_y: i32,
    zoom: u32,
    scale: u32,
    sampler: &mut S,
) -> Result<TileOutcome, PipelineError> {
    if scale == 0 {
        return Err(PipelineError::InvalidArgument("scale must be positive".into()));
    }
    let tile_size = config.tile_size.tile_size(zoom)?;
    prepare_output(config)?;

    let job = ZoomLevelJob::new(seed, &config.output_root, zoom, scale, tile_size, 1);
    config.sampler.apply(sampler, seed);

    let renderer = TileRenderer::new(config.raster);
    let progress = ProgressTracker::new(1);
    match renderer.render_tile(&job, tile_x, tile_y, sampler, &progress) {
        TileOutcome::Failed(RenderError::Directory { path, source }) => {
            Err(PipelineError::Setup { path, source })
        }
        outcome => Ok(outcome),
    }
}
