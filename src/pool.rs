//! A fixed-size pool of worker threads servicing a FIFO queue of jobs.
//!
//! One mutex guards both the queue and the shutdown flag together, rather
//! than splitting them into two locks: a worker checking "are we dying?"
//! and then waiting on the condvar has to do both under the same critical
//! section, or a `drop` that sets the flag and notifies in between could
//! slip through unseen and leave the worker asleep forever.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// A unit of work the pool runs exactly once. The pool provides no return
/// channel -- jobs coordinate through whatever state they capture.
type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    queue: VecDeque<Job>,
    dying: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    work_or_die: Condvar,
}

/// A fixed-size set of worker threads.
///
/// Dropping the pool sets the "dying" flag, wakes every waiter, and joins
/// all workers. Pending work at that point is abandoned; a worker that has
/// already dequeued a job finishes it first.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `concurrency` worker threads. `concurrency` defaults to the
    /// platform's available parallelism when the caller has no stronger
    /// opinion.
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState { queue: VecDeque::new(), dying: false }),
            work_or_die: Condvar::new(),
        });

        let workers = (0..concurrency)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(shared))
            })
            .collect();

        WorkerPool { shared, workers }
    }

    /// Push `job` onto the tail of the queue and wake one waiter.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        let mut state = self.shared.state.lock().unwrap();
        state.queue.push_back(Box::new(job));
        self.shared.work_or_die.notify_one();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.dying = true;
        }
        self.shared.work_or_die.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if state.dying {
                    return;
                }
                if let Some(job) = state.queue.pop_front() {
                    break job;
                }
                state = shared.work_or_die.wait(state).unwrap();
            }
        };
        // Don't hold the lock while doing work.
        job();
    }
}
