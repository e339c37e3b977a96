//! Bounded worker pool and the counting latch used to join on it.
//!
//! The pool contract is deliberately narrow: `core` workers are started up
//! front, the work queue is bounded at a fixed capacity, a full queue
//! spawns burst workers up to `max` before a submission is rejected
//! loudly, and a dropped sender drains the queue and retires the workers.
//! Workers also stop pulling queued work once a process-wide shutdown has
//! been requested; a job already running is never interrupted.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

use crate::errors::MoverError;
use crate::shutdown;

type Job = Box<dyn FnOnce() + Send + 'static>;

const WORKER_POLL: Duration = Duration::from_millis(200);

/// How long a submission may wait for a burst worker to free queue space.
const BURST_GRACE: Duration = Duration::from_secs(1);

pub struct WorkerPool {
    tx: Option<Sender<Job>>,
    rx: Receiver<Job>,
    handles: Vec<JoinHandle<()>>,
    live: Arc<AtomicUsize>,
    max_workers: usize,
    capacity: usize,
}

impl WorkerPool {
    /// Start a pool with `core_workers` threads and a work queue bounded at
    /// `queue_capacity` submissions.
    pub fn new(core_workers: usize, max_workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = bounded(queue_capacity);
        let mut pool = Self {
            tx: Some(tx),
            rx,
            handles: Vec::new(),
            live: Arc::new(AtomicUsize::new(0)),
            max_workers,
            capacity: queue_capacity,
        };
        for _ in 0..core_workers {
            pool.spawn_worker();
        }
        pool
    }

    fn spawn_worker(&mut self) {
        let rx = self.rx.clone();
        let live = Arc::clone(&self.live);
        live.fetch_add(1, Ordering::SeqCst);
        self.handles.push(thread::spawn(move || {
            worker_loop(rx);
            live.fetch_sub(1, Ordering::SeqCst);
        }));
    }

    /// Workers currently alive (core plus any burst workers).
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Submit one job. A full queue spawns a burst worker (up to
    /// `max_workers`) and retries once; a queue that is still full is a
    /// hard [`MoverError::QueueFull`].
    pub fn submit(&mut self, job: Job) -> Result<(), MoverError> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(MoverError::QueueFull(self.capacity));
        };
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                if self.live.load(Ordering::SeqCst) < self.max_workers {
                    self.spawn_worker();
                }
                let Some(tx) = self.tx.as_ref() else {
                    return Err(MoverError::QueueFull(self.capacity));
                };
                tx.send_timeout(job, BURST_GRACE)
                    .map_err(|_| MoverError::QueueFull(self.capacity))
            }
            Err(TrySendError::Disconnected(_)) => Err(MoverError::QueueFull(self.capacity)),
        }
    }

    /// Orderly shutdown: stop accepting work, poll for the workers to
    /// retire up to `max_polls` intervals, then force-stop stragglers by
    /// raising the process shutdown flag and detaching them.
    pub fn shutdown(mut self, poll: Duration, max_polls: usize) {
        drop(self.tx.take());
        let mut polls = 0;
        while self.live.load(Ordering::SeqCst) > 0 && polls < max_polls {
            thread::sleep(poll);
            polls += 1;
        }
        if self.live.load(Ordering::SeqCst) > 0 {
            warn!(
                stragglers = self.live.load(Ordering::SeqCst),
                "Worker pool did not retire in time; forcing stop"
            );
            shutdown::request();
            // Detach; each straggler exits after its in-flight operation.
            self.handles.clear();
        } else {
            for handle in self.handles.drain(..) {
                let _ = handle.join();
            }
        }
    }
}

fn worker_loop(rx: Receiver<Job>) {
    loop {
        if shutdown::is_requested() {
            break;
        }
        match rx.recv_timeout(WORKER_POLL) {
            Ok(job) => job(),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Counting join primitive: the orchestrator blocks until every submitted
/// task has signalled completion, or until a process shutdown is requested
/// (in which case `wait` returns `false` and the caller shortens its wait).
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    drained: Condvar,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            drained: Condvar::new(),
        }
    }

    /// Signal one task's completion. Saturates at zero.
    pub fn count_down(&self) {
        let mut remaining = lock_recover(&self.remaining);
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.drained.notify_all();
        }
    }

    pub fn pending(&self) -> usize {
        *lock_recover(&self.remaining)
    }

    /// Block until the count reaches zero. Returns `false` when the wait
    /// was cut short by a shutdown request.
    pub fn wait(&self) -> bool {
        let mut remaining = lock_recover(&self.remaining);
        loop {
            if *remaining == 0 {
                return true;
            }
            if shutdown::is_requested() {
                return false;
            }
            let (guard, _) = self
                .drained
                .wait_timeout(remaining, WORKER_POLL)
                .unwrap_or_else(|e| e.into_inner());
            remaining = guard;
        }
    }
}

fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
