use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::snapshot::{SampleWindow, SnapshotSource};
use crate::error::CollectError;

/// Upper bound on the snapshot buffer reserved up front.
const MAX_PREALLOCATED: usize = 1024;

/// Fixed sampling cadence for one window.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct CollectionPlan {
    pub interval_ms: u64,
    pub duration_ms: u64,
}

impl CollectionPlan {
    /// Full environment analysis: 3 s at 100 ms.
    pub const FULL: CollectionPlan = CollectionPlan {
        interval_ms: 100,
        duration_ms: 3000,
    };

    /// Quick auto-select: 1.5 s at 50 ms.
    pub const QUICK: CollectionPlan = CollectionPlan {
        interval_ms: 50,
        duration_ms: 1500,
    };

    pub fn snapshot_count(&self) -> usize {
        assert!(self.interval_ms > 0, "collection interval must be positive");
        (self.duration_ms / self.interval_ms) as usize
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject plans that cannot produce a single snapshot.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_ms == 0 {
            anyhow::bail!("collection interval_ms must be positive");
        }
        if self.duration_ms < self.interval_ms {
            anyhow::bail!(
                "collection duration_ms ({}) is shorter than interval_ms ({})",
                self.duration_ms,
                self.interval_ms
            );
        }
        Ok(())
    }
}

/// Shared flag that stops an in-flight collection.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Wait out each interval on the wall clock
    RealTime,
    /// Capture back to back; elapsed time is still reported on the plan's grid
    Immediate,
}

/// Periodic snapshot collector. The k-th snapshot (1-based) is taken
/// `k * interval` after the start, mirroring a repeating timer.
pub struct SampleCollector {
    plan: CollectionPlan,
    pacing: Pacing,
    cancel: CancelToken,
}

impl SampleCollector {
    pub fn new(plan: CollectionPlan, pacing: Pacing, cancel: CancelToken) -> Self {
        Self {
            plan,
            pacing,
            cancel,
        }
    }

    pub fn plan(&self) -> CollectionPlan {
        self.plan
    }

    /// Run the plan to completion. A cancelled or failed run discards
    /// everything captured so far.
    pub fn collect<S, F>(&self, source: &mut S, mut on_tick: F) -> Result<SampleWindow, CollectError>
    where
        S: SnapshotSource + ?Sized,
        F: FnMut(usize, usize),
    {
        let expected = self.plan.snapshot_count();
        if expected == 0 {
            return Err(CollectError::EmptyPlan {
                interval_ms: self.plan.interval_ms,
                duration_ms: self.plan.duration_ms,
            });
        }
        let interval = self.plan.interval();
        let started = Instant::now();
        let mut snapshots = Vec::with_capacity(expected.min(MAX_PREALLOCATED));

        for tick in 1..=expected {
            let elapsed = interval * tick as u32;

            if self.pacing == Pacing::RealTime {
                let now = started.elapsed();
                if elapsed > now {
                    std::thread::sleep(elapsed - now);
                }
            }

            if self.cancel.is_cancelled() {
                log::warn!("Collection cancelled after {}/{} samples", snapshots.len(), expected);
                return Err(CollectError::Cancelled {
                    collected: snapshots.len(),
                    expected,
                });
            }

            match source.capture(elapsed) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(source) => {
                    log::warn!(
                        "Capture failed after {}/{} samples: {}",
                        snapshots.len(),
                        expected,
                        source.category()
                    );
                    return Err(CollectError::Source {
                        collected: snapshots.len(),
                        expected,
                        source,
                    });
                }
            }

            on_tick(tick, expected);
        }

        SampleWindow::new(snapshots).ok_or(CollectError::EmptyPlan {
            interval_ms: self.plan.interval_ms,
            duration_ms: self.plan.duration_ms,
        })
    }
}
