//! Bounded worker pool for one batch of tasks

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::cancel::CancelToken;
use crate::models::TaskResult;

/// Run `job(i)` for every `i in 0..len` on up to `jobs` threads.
///
/// Results come back index-addressed regardless of completion order. A slot
/// is `None` when its job was cancelled or never started because `cancel`
/// was set. With `jobs <= 1` everything runs on the calling thread.
pub fn run_batch<F>(len: usize, jobs: usize, cancel: &CancelToken, job: F) -> Vec<Option<TaskResult>>
where
    F: Fn(usize) -> Option<TaskResult> + Sync,
{
    let mut slots: Vec<Option<TaskResult>> = (0..len).map(|_| None).collect();

    if jobs <= 1 || len <= 1 {
        for (i, slot) in slots.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            *slot = job(i);
            if slot.is_none() {
                break;
            }
        }
        return slots;
    }

    let cursor = AtomicUsize::new(0);
    let workers = jobs.min(len);

    let finished: Vec<Vec<(usize, TaskResult)>> = thread::scope(|scope| {
        let cursor = &cursor;
        let job = &job;
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    while !cancel.is_cancelled() {
                        let i = cursor.fetch_add(1, Ordering::SeqCst);
                        if i >= len {
                            break;
                        }
                        if let Some(result) = job(i) {
                            done.push((i, result));
                        }
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| {
                h.join().unwrap_or_else(|_| {
                    tracing::warn!("worker thread panicked; its results are dropped");
                    Vec::new()
                })
            })
            .collect()
    });

    for (i, result) in finished.into_iter().flatten() {
        slots[i] = Some(result);
    }
    slots
}
