//! Global thread pool for background tasks (binary file reads).
//!
//! Jobs go through one shared injector queue; each idle worker takes the next
//! job from it. Reads are independent and short, so there is no per-worker
//! queue to balance.
//!
//! The pool has no notion of results; callers ship results back over a
//! channel (see [`crate::core::binary_loader`]).

use crossbeam::deque::{Injector, Steal};
use log::{error, trace};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool for background jobs.
///
/// # Example
/// ```ignore
/// let workers = Workers::new(2);
/// workers.execute(move || {
///     let bytes = std::fs::read(&path);
///     tx.send(bytes).ok();
/// });
/// ```
pub struct Workers {
    injector: Arc<Injector<Job>>,          // Global queue for external tasks
    handles: Vec<thread::JoinHandle<()>>,  // Thread handles for proper shutdown
    shutdown: Arc<AtomicBool>,             // Shutdown signal
}

impl Workers {
    /// Create worker pool with `num_threads` threads (at least one).
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let injector: Arc<Injector<Job>> = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::new();

        for worker_id in 0..num_threads {
            let injector = Arc::clone(&injector);
            let shutdown = Arc::clone(&shutdown);

            let spawned = thread::Builder::new()
                .name(format!("attrform-worker-{}", worker_id))
                .spawn(move || {
                    trace!("Worker {} started", worker_id);

                    loop {
                        match injector.steal() {
                            Steal::Success(job) => {
                                job();
                                continue;
                            }
                            Steal::Retry => continue,
                            Steal::Empty => {}
                        }

                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }

                        // No work - short sleep to avoid CPU spin
                        thread::sleep(Duration::from_millis(1));
                    }

                    trace!("Worker {} stopped", worker_id);
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => error!("Failed to spawn worker {}: {}", worker_id, e),
            }
        }

        trace!("Workers initialized: {} threads", handles.len());

        Self {
            injector,
            handles,
            shutdown,
        }
    }

    /// Number of running threads.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Execute closure on a worker thread.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(f));
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        let num_threads = self.handles.len();
        trace!("Workers shutting down ({} threads)...", num_threads);

        self.shutdown.store(true, Ordering::SeqCst);

        // Reads are short, but a huge file may still be in flight.
        // Don't block exit on it: wait 500ms total, then let the process reap it.
        let deadline = Instant::now() + Duration::from_millis(500);

        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, exiting anyway");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {} workers stopped gracefully", num_threads);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_execute_runs_all_jobs() {
        let workers = Workers::new(3);
        assert_eq!(workers.len(), 3);

        let (tx, rx) = crossbeam_channel::unbounded();
        let counter = Arc::new(AtomicUsize::new(0));
        for i in 0..20 {
            let tx = tx.clone();
            let counter = Arc::clone(&counter);
            workers.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                tx.send(i).ok();
            });
        }

        let mut got: Vec<i32> = (0..20)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        got.sort();
        assert_eq!(got, (0..20).collect::<Vec<_>>());
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let workers = Workers::new(0);
        assert_eq!(workers.len(), 1);
        assert!(!workers.is_empty());
    }

    #[test]
    fn test_jobs_run_in_parallel() {
        // Both jobs block until the other has started, so one thread can't finish them
        let workers = Workers::new(2);
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let (tx, rx) = crossbeam_channel::unbounded();
        for i in 0..2 {
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            workers.execute(move || {
                barrier.wait();
                tx.send(i).ok();
            });
        }
        let mut got: Vec<i32> = (0..2)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        got.sort();
        assert_eq!(got, vec![0, 1]);
    }
}
