//! Mini-batch objective: parallel evaluation of a per-batch cost.
//!
//! [`MiniBatchObjective`] partitions a training set once, at construction,
//! and owns a fixed-size rayon pool for the lifetime of the objective. Each
//! [`Objective::evaluate_cost`] call spawns one task per batch into a scope
//! on that pool, drains results from a channel as they complete, and returns
//! the unweighted mean of the per-batch costs and gradients. The call is a
//! join barrier: it returns only once every task has reported.
//!
//! A batch task that errors or panics is logged and turns the whole
//! evaluation into [`OptError::BatchEvaluationFailed`], which every minimizer
//! treats as fatal.
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::mpsc,
};

use ndarray::ArrayView2;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::optimization::{
    batch::partition::{Batch, BatchRange, materialize, partition},
    errors::{OptError, OptResult},
    objective::{
        traits::Objective,
        types::{CostGradient, Grad, Theta},
        validation::validate_grad_dim,
    },
};

/// Per-batch cost and gradient.
///
/// `features` already carries the bias column of ones in column 0. The
/// returned gradient must have length `theta.len()`. Implementations are
/// shared across worker threads and must not mutate shared state.
pub trait BatchObjective: Send + Sync {
    fn evaluate_batch(
        &self, theta: &Theta, features: ArrayView2<'_, f64>, outcome: ArrayView2<'_, f64>,
    ) -> OptResult<CostGradient>;
}

impl<F> BatchObjective for F
where
    F: Fn(&Theta, ArrayView2<'_, f64>, ArrayView2<'_, f64>) -> OptResult<CostGradient> + Send + Sync,
{
    fn evaluate_batch(
        &self, theta: &Theta, features: ArrayView2<'_, f64>, outcome: ArrayView2<'_, f64>,
    ) -> OptResult<CostGradient> {
        self(theta, features, outcome)
    }
}

/// MiniBatchOptions — partitioning and pool size.
///
/// - `batch_size`: rows per batch; `0` evaluates the full training set as
///   one batch on the calling thread (no pool is started).
/// - `num_threads`: worker count of the pool (≥ 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiniBatchOptions {
    pub batch_size: usize,
    pub num_threads: usize,
}

impl Default for MiniBatchOptions {
    fn default() -> Self {
        let num_threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self { batch_size: 0, num_threads }
    }
}

pub struct MiniBatchObjective<B: BatchObjective> {
    evaluator: B,
    ranges: Vec<BatchRange>,
    batches: Vec<Batch>,
    pool: Option<ThreadPool>,
}

impl<B: BatchObjective> MiniBatchObjective<B> {
    /// Partition `features`/`outcome` (one training vector per row) and start
    /// the worker pool.
    ///
    /// # Errors
    /// - [`OptError::EmptyTrainingSet`] when there are no rows.
    /// - [`OptError::TrainingSetShapeMismatch`] when the row counts differ.
    /// - [`OptError::InvalidThreadCount`] when `num_threads == 0`.
    /// - [`OptError::ThreadPoolBuild`] when rayon cannot spawn the workers.
    pub fn new(
        evaluator: B, features: ArrayView2<'_, f64>, outcome: ArrayView2<'_, f64>,
        options: MiniBatchOptions,
    ) -> OptResult<Self> {
        let n = features.nrows();
        if n == 0 {
            return Err(OptError::EmptyTrainingSet);
        }
        if outcome.nrows() != n {
            return Err(OptError::TrainingSetShapeMismatch {
                features: n,
                outcomes: outcome.nrows(),
            });
        }
        if options.num_threads == 0 {
            return Err(OptError::InvalidThreadCount {
                count: 0,
                reason: "Worker pool needs at least one thread.",
            });
        }

        let ranges = partition(n, options.batch_size);
        let batches: Vec<Batch> =
            ranges.iter().map(|&range| materialize(features, outcome, range)).collect();
        let pool = if options.batch_size > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(options.num_threads)
                .thread_name(|i| format!("minibatch-worker-{i}"))
                .build()
                .map_err(|e| OptError::ThreadPoolBuild { text: e.to_string() })?;
            Some(pool)
        } else {
            None
        };
        log::debug!(
            "MiniBatchObjective: {} rows in {} batches on {} threads",
            n,
            ranges.len(),
            if pool.is_some() { options.num_threads } else { 1 }
        );
        Ok(Self { evaluator, ranges, batches, pool })
    }

    pub fn ranges(&self) -> &[BatchRange] {
        &self.ranges
    }

    pub fn num_batches(&self) -> usize {
        self.ranges.len()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.ranges.iter().map(BatchRange::len).collect()
    }

    pub fn evaluator(&self) -> &B {
        &self.evaluator
    }

    /// Evaluate one batch, turning errors, panics and malformed gradients
    /// into [`OptError::BatchEvaluationFailed`].
    fn run_batch(&self, index: usize, theta: &Theta) -> OptResult<CostGradient> {
        let batch = &self.batches[index];
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.evaluator.evaluate_batch(theta, batch.features.view(), batch.outcome.view())
        }));
        let failure = |text: String| OptError::BatchEvaluationFailed { batch: index, text };
        match outcome {
            Ok(Ok(out)) => {
                validate_grad_dim(&out.gradient, theta.len()).map_err(|e| failure(e.to_string()))?;
                Ok(out)
            }
            Ok(Err(e)) => Err(failure(e.to_string())),
            Err(payload) => Err(failure(panic_message(payload.as_ref()))),
        }
    }

    fn evaluate_parallel(&self, pool: &ThreadPool, theta: &Theta) -> OptResult<CostGradient> {
        let (tx, rx) = mpsc::channel::<(usize, OptResult<CostGradient>)>();
        let mut cost_sum = 0.0;
        let mut grad_sum = Grad::zeros(theta.len());
        let mut first_failure: Option<OptError> = None;

        pool.in_place_scope(|scope| {
            for index in 0..self.batches.len() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    // The receiver outlives the scope, so a send cannot fail.
                    let _ = tx.send((index, self.run_batch(index, theta)));
                });
            }
            drop(tx);

            for (index, result) in rx.iter() {
                match result {
                    Ok(out) => {
                        cost_sum += out.cost;
                        grad_sum += &out.gradient;
                    }
                    Err(e) => {
                        log::error!("MiniBatchObjective: batch {index} failed: {e}");
                        first_failure.get_or_insert(e);
                    }
                }
            }
        });

        if let Some(e) = first_failure {
            return Err(e);
        }
        let n = self.batches.len() as f64;
        Ok(CostGradient::new(cost_sum / n, grad_sum / n))
    }
}

impl<B: BatchObjective> Objective for MiniBatchObjective<B> {
    fn evaluate_cost(&self, theta: &Theta) -> OptResult<CostGradient> {
        match &self.pool {
            Some(pool) => self.evaluate_parallel(pool, theta),
            None => self.run_batch(0, theta).inspect_err(|e| {
                log::error!("MiniBatchObjective: full batch failed: {e}");
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}
