//! Background generation pool with a consumer-side completion queue.
//!
//! Jobs run on a fixed set of worker threads. A finished job enqueues its
//! callback together with the result; the consumer runs those callbacks in
//! completion order by calling [`GenerationQueue::drain_once`] once per tick,
//! so callbacks never race the consumer's own state.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::JobError;

type Task = Box<dyn FnOnce() + Send>;
type Completion<S> = Box<dyn FnOnce(&mut S) + Send>;

enum WorkerMessage {
    Run(Task),
    Stop,
}

/// Worker count used when none is configured: all cores but one, at least one.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Cloneable handle for submitting jobs whose callbacks receive `&mut S`.
pub struct Submitter<S> {
    tasks: Sender<WorkerMessage>,
    completions: Sender<Completion<S>>,
    /// Jobs submitted whose callbacks have not run yet.
    in_flight: Arc<AtomicUsize>,
}

impl<S> Clone for Submitter<S> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            completions: self.completions.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: 'static> Submitter<S> {
    /// Run `job` on a worker and queue `callback` with its result.
    ///
    /// A panicking job is reported to the callback as [`JobError::Panicked`].
    /// Submitting after the queue shut down drops the job with a warning.
    pub fn submit<T, J, C>(&self, job: J, callback: C)
    where
        T: Send + 'static,
        J: FnOnce() -> Result<T, JobError> + Send + 'static,
        C: FnOnce(&mut S, Result<T, JobError>) + Send + 'static,
    {
        let completions = self.completions.clone();
        let task: Task = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job))
                .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload.as_ref()))));
            let completion: Completion<S> = Box::new(move |state| callback(state, result));
            // The receiver is gone only while the queue is being torn down.
            let _ = completions.send(completion);
        });

        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if self.tasks.send(WorkerMessage::Run(task)).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            tracing::warn!("generation queue is shut down, dropping job");
        }
    }
}

impl<S> Submitter<S> {
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Fixed-size worker pool plus the completion queue drained by the consumer.
pub struct GenerationQueue<S> {
    submitter: Submitter<S>,
    completions: Receiver<Completion<S>>,
    workers: Vec<JoinHandle<()>>,
}

impl<S> GenerationQueue<S> {
    /// Spawn `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, task_receiver) = unbounded::<WorkerMessage>();
        let (completion_sender, completion_receiver) = unbounded::<Completion<S>>();

        let workers = (0..worker_count)
            .map(|index| {
                let receiver = task_receiver.clone();
                std::thread::Builder::new()
                    .name(format!("terrain-gen-worker-{index}"))
                    .spawn(move || {
                        while let Ok(WorkerMessage::Run(task)) = receiver.recv() {
                            task();
                        }
                    })
                    .expect("Failed to spawn terrain generation worker thread")
            })
            .collect();

        tracing::debug!(worker_count, "generation queue started");

        Self {
            submitter: Submitter {
                tasks: task_sender,
                completions: completion_sender,
                in_flight: Arc::new(AtomicUsize::new(0)),
            },
            completions: completion_receiver,
            workers,
        }
    }

    /// Pool sized by [`default_worker_count`].
    pub fn with_defaults() -> Self {
        Self::new(default_worker_count())
    }

    /// A handle that callbacks can keep to submit follow-up jobs.
    pub fn submitter(&self) -> Submitter<S> {
        self.submitter.clone()
    }

    /// Run every callback that was queued when this call started, in
    /// completion order. Callbacks queued meanwhile wait for the next call.
    ///
    /// Call this once per tick on the consumer thread. Returns the number of
    /// callbacks run.
    pub fn drain_once(&self, state: &mut S) -> usize {
        let pending = self.completions.len();
        let mut handled = 0;
        for _ in 0..pending {
            let Ok(completion) = self.completions.try_recv() else {
                break;
            };
            self.submitter.in_flight.fetch_sub(1, Ordering::Relaxed);
            completion(state);
            handled += 1;
        }
        handled
    }

    /// Jobs queued, running, or waiting for their callback.
    pub fn in_flight_count(&self) -> usize {
        self.submitter.in_flight_count()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Let workers finish the jobs already queued, then join them.
    ///
    /// Undrained callbacks are discarded with the queue.
    pub fn shutdown(&mut self) {
        for _ in 0..self.workers.len() {
            let _ = self.submitter.tasks.send(WorkerMessage::Stop);
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl<S: 'static> GenerationQueue<S> {
    /// Shorthand for `self.submitter().submit(job, callback)`.
    pub fn submit<T, J, C>(&self, job: J, callback: C)
    where
        T: Send + 'static,
        J: FnOnce() -> Result<T, JobError> + Send + 'static,
        C: FnOnce(&mut S, Result<T, JobError>) + Send + 'static,
    {
        self.submitter.submit(job, callback);
    }
}

impl<S> Drop for GenerationQueue<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};
    use strata_mesh::MeshError;

    fn drain_until<S>(queue: &GenerationQueue<S>, state: &mut S, done: impl Fn(&S) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done(state) && Instant::now() < deadline {
            queue.drain_once(state);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_callbacks_run_on_consumer_thread() {
        let queue = GenerationQueue::<Vec<thread::ThreadId>>::new(2);
        let consumer = thread::current().id();

        for _ in 0..4 {
            queue.submit(
                || Ok(thread::current().id()),
                |seen: &mut Vec<thread::ThreadId>, worker| {
                    assert_ne!(worker.unwrap(), thread::current().id());
                    seen.push(thread::current().id());
                },
            );
        }

        let mut seen = Vec::new();
        drain_until(&queue, &mut seen, |s| s.len() == 4);
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|&id| id == consumer));
    }

    #[test]
    fn test_callbacks_fire_in_completion_order() {
        let queue = GenerationQueue::<Vec<u64>>::new(3);
        for delay in [300_u64, 50, 150] {
            queue.submit(
                move || {
                    thread::sleep(Duration::from_millis(delay));
                    Ok(delay)
                },
                |order: &mut Vec<u64>, result| order.push(result.unwrap()),
            );
        }

        let mut order = Vec::new();
        drain_until(&queue, &mut order, |o| o.len() == 3);
        assert_eq!(order, vec![50, 150, 300]);
    }

    #[test]
    fn test_nothing_runs_without_drain() {
        let queue = GenerationQueue::<u32>::new(1);
        queue.submit(|| Ok(()), |count: &mut u32, _| *count += 1);

        let deadline = Instant::now() + Duration::from_secs(10);
        while queue.completions.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let mut count = 0;
        assert_eq!(queue.in_flight_count(), 1);
        assert_eq!(queue.drain_once(&mut count), 1);
        assert_eq!(count, 1);
        assert_eq!(queue.in_flight_count(), 0);
    }

    #[test]
    fn test_panicking_job_reports_error() {
        let queue = GenerationQueue::<Option<Result<u8, JobError>>>::new(1);
        queue.submit(
            || -> Result<u8, JobError> { panic!("noise exploded") },
            |slot: &mut Option<Result<u8, JobError>>, result| *slot = Some(result),
        );

        let mut slot = None;
        drain_until(&queue, &mut slot, Option::is_some);
        assert_eq!(
            slot,
            Some(Err(JobError::Panicked("noise exploded".to_string())))
        );

        // The worker survives the panic.
        queue.submit(|| Ok(7_u8), |slot: &mut Option<_>, result| *slot = Some(result));
        slot = None;
        drain_until(&queue, &mut slot, Option::is_some);
        assert_eq!(slot, Some(Ok(7)));
    }

    #[test]
    fn test_job_error_passes_through() {
        let queue = GenerationQueue::<Option<Result<(), JobError>>>::new(1);
        queue.submit(
            || Err(JobError::from(MeshError::EmptyCurve)),
            |slot: &mut Option<_>, result| *slot = Some(result),
        );
        let mut slot = None;
        drain_until(&queue, &mut slot, Option::is_some);
        assert_eq!(slot, Some(Err(JobError::Mesh(MeshError::EmptyCurve))));
    }

    struct Chain {
        submitter: Submitter<Chain>,
        steps: Vec<&'static str>,
    }

    #[test]
    fn test_follow_up_jobs_wait_for_next_drain() {
        let queue = GenerationQueue::<Chain>::new(2);
        let mut chain = Chain {
            submitter: queue.submitter(),
            steps: Vec::new(),
        };

        queue.submit(
            || Ok(()),
            |chain: &mut Chain, _| {
                chain.steps.push("first");
                chain
                    .submitter
                    .submit(|| Ok(()), |chain: &mut Chain, _| chain.steps.push("second"));
            },
        );

        let deadline = Instant::now() + Duration::from_secs(10);
        while queue.completions.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(queue.drain_once(&mut chain), 1);
        assert_eq!(chain.steps, vec!["first"]);

        drain_until(&queue, &mut chain, |c| c.steps.len() == 2);
        assert_eq!(chain.steps, vec!["first", "second"]);
        assert_eq!(queue.in_flight_count(), 0);
    }

    #[test]
    fn test_shutdown_joins_workers() {
        let mut queue = GenerationQueue::<u32>::new(3);
        assert_eq!(queue.worker_count(), 3);
        queue.submit(|| Ok(()), |_: &mut u32, _| {});
        queue.shutdown();
        assert_eq!(queue.worker_count(), 0);

        // Workers are gone, so the job is dropped instead of queued forever.
        queue.submit(|| Ok(()), |_: &mut u32, _| {});
        assert_eq!(queue.in_flight_count(), 1);
    }

    #[test]
    fn test_default_worker_count_is_positive() {
        assert!(default_worker_count() >= 1);
        assert!(GenerationQueue::<()>::with_defaults().worker_count() >= 1);
    }
}
