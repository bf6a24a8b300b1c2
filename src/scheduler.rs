//! Bounded worker pool for zoom-level jobs.
//!
//! Jobs are queued on `submit` and run by `await_all` on a dedicated rayon pool
//! with a fixed number of threads. Each running job gets its own sampler from the
//! factory; jobs beyond the pool size wait for a free thread.

use std::collections::VecDeque;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::PipelineError;
use crate::progress::ProgressTracker;
use crate::render::TileRenderer;
use crate::sampler::{SamplerSettings, WorldSampler};
use crate::worker::{run_zoom_level, WorkerReport, ZoomLevelJob};

pub struct JobScheduler<F> {
    pool: ThreadPool,
    queue: VecDeque<ZoomLevelJob>,
    make_sampler: F,
    settings: SamplerSettings,
    renderer: TileRenderer,
}

impl<F, S> JobScheduler<F>
where
    F: Fn() -> S + Sync,
    S: WorldSampler,
{
    /// Create a scheduler running at most `capacity` jobs at once (0 = one per CPU).
    pub fn new(
        capacity: usize,
        make_sampler: F,
        settings: SamplerSettings,
        renderer: TileRenderer,
    ) -> Result<Self, PipelineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(capacity)
            .thread_name(|i| format!("zoom-worker-{}", i))
            .build()?;
        Ok(Self {
            pool,
            queue: VecDeque::new(),
            make_sampler,
            settings,
            renderer,
        })
    }

    /// Number of jobs that can run at the same time.
    pub fn capacity(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue a job. Jobs are never dropped, however many are queued.
    pub fn submit(&mut self, job: ZoomLevelJob) {
        log::info!(
            "Queued zoom level {} ({}x{} tiles, tile size {}, scale {})",
            job.zoom_level,
            job.tiles_per_side,
            job.tiles_per_side,
            job.tile_size,
            job.scale
        );
        self.queue.push_back(job);
    }

    pub fn queued_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Tiles across every queued job.
    pub fn queued_tiles(&self) -> u64 {
        self.queue.iter().map(ZoomLevelJob::tile_count).sum()
    }

    /// Run every queued job and block until all have finished.
    ///
    /// Reports come back in submission order.
    pub fn await_all(&mut self, progress: &ProgressTracker) -> Vec<WorkerReport> {
        let jobs: Vec<ZoomLevelJob> = self.queue.drain(..).collect();
        if jobs.is_empty() {
            return Vec::new();
        }
        log::info!(
            "Running {} zoom level jobs on {} workers",
            jobs.len(),
            self.capacity()
        );

        let make_sampler = &self.make_sampler;
        let settings = &self.settings;
        let renderer = &self.renderer;
        self.pool.install(|| {
            jobs.par_iter()
                .with_max_len(1)
                .map(|job| {
                    let mut sampler = make_sampler();
                    run_zoom_level(job, settings, &mut sampler, renderer, progress)
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::Biome;
    use crate::coords::TileRegion;
    use crate::error::SampleError;
    use crate::raster::RasterOptions;
    use crate::sampler::{alloc_grid, BiomeFlavor, BiomeGrid, Dimension, GeneratorVersion};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingSampler<'a> {
        calls: &'a AtomicUsize,
    }

    impl WorldSampler for CountingSampler<'_> {
        fn configure(&mut self, _: GeneratorVersion, _: BiomeFlavor) {}
        fn apply_seed(&mut self, _: Dimension, _: u64) {}
        fn sample_biomes(&mut self, region: &TileRegion) -> Result<BiomeGrid, SampleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            alloc_grid(region, Biome::Taiga.id())
        }
    }

    #[test]
    fn test_more_jobs_than_workers_all_run() {
        let dir = tempdir().unwrap();
        let calls = AtomicUsize::new(0);
        let created = AtomicUsize::new(0);
        let renderer = TileRenderer::new(RasterOptions {
            pixels_per_cell: 1,
            ..Default::default()
        });
        let mut scheduler = JobScheduler::new(
            2,
            || {
                created.fetch_add(1, Ordering::SeqCst);
                CountingSampler { calls: &calls }
            },
            SamplerSettings::default(),
            renderer,
        )
        .unwrap();
        assert_eq!(scheduler.capacity(), 2);

        for zoom in 0..5 {
            scheduler.submit(ZoomLevelJob::new(9, dir.path(), zoom, 1, 2, 2));
        }
        assert_eq!(scheduler.queued_jobs(), 5);
        assert_eq!(scheduler.queued_tiles(), 20);

        let progress = ProgressTracker::new(scheduler.queued_tiles());
        let reports = scheduler.await_all(&progress);

        assert_eq!(reports.len(), 5);
        let zooms: Vec<u32> = reports.iter().map(|r| r.zoom_level).collect();
        assert_eq!(zooms, vec![0, 1, 2, 3, 4]);
        assert!(reports.iter().all(|r| r.rendered == 4));
        assert_eq!(created.load(Ordering::SeqCst), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 20);
        assert_eq!(progress.snapshot().completed, 20);
        assert_eq!(scheduler.queued_jobs(), 0);
    }

    #[test]
    fn test_await_with_nothing_queued() {
        let calls = AtomicUsize::new(0);
        let mut scheduler = JobScheduler::new(
            1,
            || CountingSampler { calls: &calls },
            SamplerSettings::default(),
            TileRenderer::new(RasterOptions::default()),
        )
        .unwrap();
        assert!(scheduler.await_all(&ProgressTracker::new(0)).is_empty());
    }
}
