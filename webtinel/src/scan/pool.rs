use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::matcher::FileMatcher;
use crate::results::ScanReport;

/// Longest a worker waits for a task before treating the queue as done.
/// Backstop for the closed-queue protocol; normally workers exit on
/// disconnect the moment the queue drains.
const IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs the scan across a bounded pool of workers.
///
/// All tasks are enqueued up front, then the sender is dropped so the
/// queue acts as a closed FIFO: each worker pulls until it observes
/// disconnection (or the stop flag). Each worker accumulates a partial
/// report and sends it back once on exit; the calling thread merges the
/// partials. Returns only after every worker has exited.
pub fn run(
    files: Vec<PathBuf>,
    matcher: &FileMatcher,
    worker_count: usize,
    stop: &AtomicBool,
) -> ScanReport {
    let worker_count = worker_count.max(1);
    let (task_tx, task_rx) = unbounded::<PathBuf>();
    let (outcome_tx, outcome_rx) = unbounded::<ScanReport>();

    let task_count = files.len();
    for file in files {
        // send on an unbounded channel only fails if disconnected
        let _ = task_tx.send(file);
    }
    // Close the queue: a drained worker observes Disconnected and exits
    drop(task_tx);

    debug!("Launching {} workers for {} tasks", worker_count, task_count);

    thread::scope(|scope| {
        for id in 0..worker_count {
            let task_rx = task_rx.clone();
            let outcome_tx = outcome_tx.clone();
            scope.spawn(move || worker_loop(id, task_rx, outcome_tx, matcher, stop));
        }
        drop(task_rx);
        drop(outcome_tx);

        let mut report = ScanReport::new();
        for partial in outcome_rx.iter() {
            report.merge(partial);
        }
        report
    })
}

/// One worker: pull a task, scan it, fold the result into a local
/// report, repeat.
///
/// A file that fails to read is logged and counted as skipped; it never
/// takes the worker down. The worker exits when the queue disconnects,
/// when it sits idle past [`IDLE_TIMEOUT`], or when the stop flag is
/// raised (current file finishes, remainder of the queue is abandoned).
/// Its partial report is sent back exactly once, on exit.
fn worker_loop(
    id: usize,
    tasks: Receiver<PathBuf>,
    outcomes: Sender<ScanReport>,
    matcher: &FileMatcher,
    stop: &AtomicBool,
) {
    let mut report = ScanReport::new();
    loop {
        if stop.load(Ordering::Relaxed) {
            debug!("Worker {} exiting on stop signal", id);
            break;
        }

        match tasks.recv_timeout(IDLE_TIMEOUT) {
            Ok(path) => match matcher.scan_file(&path) {
                Ok(findings) => report.add_scanned(findings),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.add_skipped();
                }
            },
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} drained the queue", id);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("Worker {} idle past {:?}, exiting", id, IDLE_TIMEOUT);
                break;
            }
        }
    }
    let _ = outcomes.send(report);
}
