//! Shared tile progress with an elapsed-time ETA.
//!
//! One tracker is created per run and handed to every worker by reference. The
//! counters and the status log lines share a single lock, so lines from different
//! workers never interleave mid-update.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Point-in-time view of the counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
    pub elapsed: Duration,
    /// Estimated time left; `None` before the first completion
    pub remaining: Option<Duration>,
}

impl ProgressSnapshot {
    /// Completion as a percentage (100 for an empty run).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn summary(&self) -> String {
        let eta = self
            .remaining
            .map(|r| format!("{:.1}s", r.as_secs_f64()))
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "{}/{} tiles ({:.1}%) | elapsed {:.1}s | ETA {}",
            self.completed,
            self.total,
            self.percent(),
            self.elapsed.as_secs_f64(),
            eta
        )
    }
}

struct Counters {
    total: u64,
    completed: u64,
}

/// Tile counter shared by all workers of a run.
pub struct ProgressTracker {
    counters: Mutex<Counters>,
    start: Instant,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            counters: Mutex::new(Counters { total, completed: 0 }),
            start: Instant::now(),
        }
    }

    // A worker that panicked mid-update leaves plain integers behind; keep going.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count one finished tile (rendered, cached or failed) and log the status line.
    pub fn record_completion(&self) -> ProgressSnapshot {
        let mut counters = self.lock();
        if counters.completed < counters.total {
            counters.completed += 1;
        } else {
            log::warn!("More tiles completed than planned ({})", counters.total);
        }
        let snapshot = self.snapshot_locked(&counters);
        log::info!("{}", snapshot.summary());
        snapshot
    }

    /// Log a line while holding the progress lock.
    pub fn log_locked(&self, message: &str) {
        let _counters = self.lock();
        log::info!("{}", message);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let counters = self.lock();
        self.snapshot_locked(&counters)
    }

    fn snapshot_locked(&self, counters: &Counters) -> ProgressSnapshot {
        let elapsed = self.start.elapsed();
        let remaining = estimate_remaining(elapsed, counters.completed, counters.total);
        ProgressSnapshot {
            completed: counters.completed,
            total: counters.total,
            elapsed,
            remaining,
        }
    }
}

/// `elapsed / completed * total - elapsed`, or `None` when nothing is complete yet.
pub fn estimate_remaining(elapsed: Duration, completed: u64, total: u64) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let per_tile = elapsed.as_secs_f64() / completed as f64;
    let projected = per_tile * total as f64;
    Some(Duration::from_secs_f64((projected - elapsed.as_secs_f64()).max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_estimate_remaining() {
        assert_eq!(estimate_remaining(Duration::from_secs(10), 0, 100), None);
        let eta = estimate_remaining(Duration::from_secs(10), 25, 100).unwrap();
        assert!((eta.as_secs_f64() - 30.0).abs() < 1e-9);
        let done = estimate_remaining(Duration::from_secs(10), 100, 100).unwrap();
        assert_eq!(done, Duration::ZERO);
    }

    #[test]
    fn test_completed_never_exceeds_total() {
        let tracker = ProgressTracker::new(3);
        for _ in 0..5 {
            tracker.record_completion();
        }
        let snap = tracker.snapshot();
        assert_eq!(snap.completed, 3);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.percent(), 100.0);
    }

    #[test]
    fn test_concurrent_completions_are_all_counted() {
        let tracker = Arc::new(ProgressTracker::new(400));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let snap = tracker.record_completion();
                        assert!(snap.completed <= snap.total);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.snapshot().completed, 400);
    }

    #[test]
    fn test_empty_run_summary() {
        let tracker = ProgressTracker::new(0);
        let snap = tracker.snapshot();
        assert_eq!(snap.remaining, None);
        assert!(snap.summary().contains("0/0 tiles"));
    }
}
