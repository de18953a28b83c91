//! Agent Scheduler / Cycle Engine (`§4.5`, `§2` ~15% share).

pub mod context;
pub mod cycle;
pub mod physiology;
pub mod stats;

pub use cycle::CycleEngine;
pub use stats::SchedulerStatsSnapshot;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Drives a [`CycleEngine`] on a fixed-delay timer: the next cycle is
/// scheduled only after the previous one returns (`§5` "Scheduling
/// model"), so cycle duration may exceed `interval` under load. Returns a
/// stop flag the caller can set; the current cycle is allowed to finish
/// before the loop exits (`§5` "Cancellation and timeouts").
pub fn spawn_loop(engine: Arc<CycleEngine>, interval_ms: u64) -> (tokio::task::JoinHandle<()>, Arc<AtomicBool>) {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handle = stop.clone();
    let handle = tokio::spawn(async move {
        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if let Err(err) = engine.run_cycle().await {
                tracing::error!(error = %err, "scheduler cycle failed");
            }
            if stop.load(Ordering::Relaxed) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(interval_ms)).await;
        }
    });
    (handle, stop_handle)
}
