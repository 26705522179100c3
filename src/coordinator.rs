//! Fan-out, join and reduction of the sampling workers.
//!
//! One run is a single pass: validate and split the budget, spawn one
//! [`Sampler`] per share, join every worker, sum the partial hit counts.
//! Workers share nothing but the share value each is handed at spawn time.

use crate::config::Backend;
use crate::error::EstimateError;
use crate::partition::WorkAssignment;
use crate::sampler::Sampler;
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::{debug, info, warn};

/// Work run by one worker: `(worker index, assigned samples) -> hits`.
pub(crate) type SampleJob = fn(usize, u64) -> u64;

/// Stack size override for a worker index; `None` keeps the platform default.
pub(crate) type StackPolicy = fn(usize) -> Option<usize>;

fn sample_fresh_stream(worker: usize, samples: u64) -> u64 {
    Sampler::new(worker).run(samples)
}

fn default_stack(_worker: usize) -> Option<usize> {
    None
}

/// Result of one estimation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// 4 × hits / total_trials
    pub pi: f64,
    /// Sum of every worker's hit count
    pub hits: u64,
    pub total_trials: u64,
    /// Workers actually spawned
    pub effective_workers: usize,
    /// Workers asked for, before clamping
    pub requested_workers: usize,
    pub backend: Backend,
}

impl Estimate {
    /// Whether the worker request was clamped to a single worker.
    pub fn clamped(&self) -> bool {
        self.requested_workers != self.effective_workers
    }

    /// Absolute distance from `std::f64::consts::PI`.
    pub fn abs_error(&self) -> f64 {
        (self.pi - std::f64::consts::PI).abs()
    }
}

/// Runs estimates on a chosen [`Backend`].
#[derive(Debug, Clone, Copy)]
pub struct Coordinator {
    backend: Backend,
    job: SampleJob,
    stack_size: StackPolicy,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(Backend::default())
    }
}

impl Coordinator {
    pub fn new(backend: Backend) -> Self {
        Coordinator {
            backend,
            job: sample_fresh_stream,
            stack_size: default_stack,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_job(backend: Backend, job: SampleJob) -> Self {
        Coordinator {
            job,
            ..Self::new(backend)
        }
    }

    #[cfg(test)]
    pub(crate) fn with_stack_size(self, stack_size: StackPolicy) -> Self {
        Coordinator { stack_size, ..self }
    }

    /// Estimate π from `total` trials spread over `workers` workers.
    ///
    /// # Errors
    /// - [`EstimateError::InvalidInput`] if `total < 2`; nothing is spawned.
    /// - [`EstimateError::ResourceExhaustion`] if the pool or a worker
    ///   cannot be started.
    /// - [`EstimateError::JoinFailure`] if any worker is lost.
    pub fn estimate(&self, total: u64, workers: usize) -> Result<Estimate, EstimateError> {
        let assignment = WorkAssignment::new(total, workers)?;

        if assignment.is_clamped() {
            warn!(
                requested = workers,
                total, "worker count not usable for this sample size, running on a single worker"
            );
        }

        debug!(
            backend = %self.backend,
            workers = assignment.workers(),
            shares = ?assignment.shares(),
            "work assignment ready"
        );

        let partials = match self.backend {
            Backend::Threads => fan_out_threads(&assignment, self.job, self.stack_size)?,
            Backend::Rayon => fan_out_rayon(&assignment, self.job, self.stack_size)?,
        };
        let hits = reduce(&assignment, &partials);
        let pi = 4.0 * hits as f64 / total as f64;

        info!(total, hits, workers = assignment.workers(), pi, "estimate complete");

        Ok(Estimate {
            pi,
            hits,
            total_trials: total,
            effective_workers: assignment.workers(),
            requested_workers: assignment.requested(),
            backend: self.backend,
        })
    }
}

/// Estimate π on the default backend.
///
/// # Examples
/// ```
/// let estimate = piapprox::estimate(100_000, 4)?;
/// assert_eq!(estimate.effective_workers, 4);
/// assert!((estimate.pi - std::f64::consts::PI).abs() < 0.1);
/// # Ok::<(), piapprox::EstimateError>(())
/// ```
pub fn estimate(total: u64, workers: usize) -> Result<Estimate, EstimateError> {
    Coordinator::default().estimate(total, workers)
}

fn reduce(assignment: &WorkAssignment, partials: &[u64]) -> u64 {
    debug_assert_eq!(partials.len(), assignment.workers());
    debug_assert!(partials
        .iter()
        .zip(assignment.shares())
        .all(|(hits, share)| hits <= share));

    partials.iter().sum()
}

/// One named OS thread per share.
fn fan_out_threads(
    assignment: &WorkAssignment,
    job: SampleJob,
    stack_size: StackPolicy,
) -> Result<Vec<u64>, EstimateError> {
    let mut handles = Vec::with_capacity(assignment.workers());

    for (worker, &samples) in assignment.shares().iter().enumerate() {
        let mut builder = thread::Builder::new().name(format!("sampler-{worker}"));
        if let Some(size) = stack_size(worker) {
            builder = builder.stack_size(size);
        }
        let spawned = builder.spawn(move || job(worker, samples));

        match spawned {
            Ok(handle) => {
                debug!(worker, samples, "sampler spawned");
                handles.push(handle);
            }
            Err(source) => {
                // Do not leave already running workers behind.
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(EstimateError::resource(format!("worker {worker}"), source));
            }
        }
    }

    let mut partials = Vec::with_capacity(handles.len());
    let mut lost = None;

    for (worker, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(hits) => {
                debug!(worker, hits, "sampler joined");
                partials.push(hits);
            }
            Err(payload) => {
                let err = EstimateError::lost_worker(worker, payload.as_ref());
                warn!(worker, error = %err, "sampler lost");
                if lost.is_none() {
                    lost = Some(err);
                }
            }
        }
    }

    match lost {
        Some(err) => Err(err),
        None => Ok(partials),
    }
}

/// A dedicated rayon pool with as many threads as shares.
///
/// Each share is one job; rayon's work stealing decides which pool thread
/// runs it, so short jobs may end up sharing a thread.
fn fan_out_rayon(
    assignment: &WorkAssignment,
    job: SampleJob,
    stack_size: StackPolicy,
) -> Result<Vec<u64>, EstimateError> {
    let mut builder = rayon::ThreadPoolBuilder::new()
        .num_threads(assignment.workers())
        .thread_name(|i| format!("sampler-pool-{i}"));
    if let Some(size) = stack_size(0) {
        builder = builder.stack_size(size);
    }
    let pool = builder
        .build()
        .map_err(|e| EstimateError::resource("sampler pool", e))?;

    let outcomes: Vec<Result<u64, EstimateError>> = pool.install(|| {
        assignment
            .shares()
            .par_iter()
            .enumerate()
            .map(|(worker, &samples)| {
                panic::catch_unwind(AssertUnwindSafe(|| job(worker, samples)))
                    .map_err(|payload| EstimateError::lost_worker(worker, payload.as_ref()))
            })
            .collect()
    });

    outcomes
        .into_iter()
        .enumerate()
        .map(|(worker, outcome)| {
            match &outcome {
                Ok(hits) => debug!(worker, hits, "sampler joined"),
                Err(err) => warn!(worker, error = %err, "sampler lost"),
            }
            outcome
        })
        .collect()
}
