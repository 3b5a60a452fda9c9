//! Batch partitioning and bias-augmented batch materialization.
//!
//! A training set of `n` rows is split into consecutive, disjoint, inclusive
//! [`BatchRange`]s covering `[0, n)` exactly once. With `batch_size = b > 0`
//! there are `⌈n / b⌉` ranges of `b` rows each, except that the last one
//! holds the remainder. `batch_size = 0` or `b ≥ n` yields a single range.
use ndarray::{Array2, ArrayView2, s};

use crate::optimization::objective::types::{Features, Outcomes};

/// Inclusive row range `[start, end]` of one mini-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRange {
    pub start: usize,
    pub end: usize,
}

// A range always covers at least one row.
#[allow(clippy::len_without_is_empty)]
impl BatchRange {
    /// Number of rows covered (always ≥ 1).
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Split `n` rows into batches of at most `batch_size` rows.
///
/// Returns an empty vector when `n == 0`.
pub fn partition(n: usize, batch_size: usize) -> Vec<BatchRange> {
    if n == 0 {
        return Vec::new();
    }
    if batch_size == 0 || batch_size >= n {
        return vec![BatchRange { start: 0, end: n - 1 }];
    }
    (0..n)
        .step_by(batch_size)
        .map(|start| BatchRange { start, end: (start + batch_size).min(n) - 1 })
        .collect()
}

/// One materialized mini-batch.
///
/// `features` carries a leading column of ones (the bias term), so it has
/// one more column than the training set it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: Features,
    pub outcome: Outcomes,
}

/// Copy the rows of `range` out of the training set and prepend the bias
/// column to the features.
pub fn materialize(
    features: ArrayView2<'_, f64>, outcome: ArrayView2<'_, f64>, range: BatchRange,
) -> Batch {
    let slice = features.slice(s![range.start..=range.end, ..]);
    let mut with_bias = Array2::ones((slice.nrows(), slice.ncols() + 1));
    with_bias.slice_mut(s![.., 1..]).assign(&slice);
    let outcome = outcome.slice(s![range.start..=range.end, ..]).to_owned();
    Batch { features: with_bias, outcome }
}
