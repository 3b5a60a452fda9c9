//! Bounded L-BFGS correction history and the two-loop recursion.
//!
//! Holds the parallel lists `sₖ = θₖ₊₁ − θₖ`, `yₖ = gₖ₊₁ − gₖ` and
//! `ρₖ = sₖ·yₖ`. Once more than `m` corrections are held, the oldest is
//! evicted. The two-loop recursion walks the lists newest-first, scales by
//! `ρ_last / (y_last·y_last)`, then walks oldest-first.
use std::collections::VecDeque;

use crate::optimization::objective::types::Grad;

#[derive(Debug, Clone)]
pub struct CorrectionHistory {
    capacity: usize,
    s: VecDeque<Grad>,
    y: VecDeque<Grad>,
    rho: VecDeque<f64>,
}

impl CorrectionHistory {
    /// Empty history holding at most `capacity` corrections (`capacity ≥ 1`).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            s: VecDeque::with_capacity(capacity + 1),
            y: VecDeque::with_capacity(capacity + 1),
            rho: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.rho.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rho.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append the correction `(s, y, s·y)` and evict the oldest one if the
    /// history now exceeds its capacity.
    pub fn push(&mut self, s: Grad, y: Grad) {
        let rho = s.dot(&y);
        self.s.push_back(s);
        self.y.push_back(y);
        self.rho.push_back(rho);
        if self.rho.len() > self.capacity {
            self.s.pop_front();
            self.y.pop_front();
            self.rho.pop_front();
        }
    }

    /// Map `dir` by the implicit inverse-Hessian approximation, in place.
    ///
    /// Leaves `dir` untouched when the history is empty.
    pub fn map_direction(&self, dir: &mut Grad) {
        let count = self.len();
        if count == 0 {
            return;
        }
        let mut alphas = vec![0.0; count];
        for i in (0..count).rev() {
            alphas[i] = -self.s[i].dot(dir) / self.rho[i];
            dir.scaled_add(alphas[i], &self.y[i]);
        }

        let last_y = &self.y[count - 1];
        let y_dot_y = last_y.dot(last_y);
        let scalar = self.rho[count - 1] / y_dot_y;
        dir.mapv_inplace(|v| v * scalar);

        for i in 0..count {
            let beta = self.y[i].dot(dir) / self.rho[i];
            dir.scaled_add(-alphas[i] - beta, &self.s[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Capacity bound and oldest-first eviction.
    // - The two-loop recursion against an explicit BFGS inverse-Hessian update.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The history never holds more than `m` corrections and evicts the oldest.
    //
    // Given
    // -----
    // - Capacity 3 and 10 pushes tagged by their index.
    //
    // Expect
    // ------
    // - Length stays ≤ 3 after every push; the survivors are pushes 7, 8, 9.
    fn history_is_bounded_and_evicts_oldest() {
        // Arrange
        let mut history = CorrectionHistory::new(3);

        // Act / Assert
        for k in 0..10 {
            let tag = k as f64 + 1.0;
            history.push(array![tag, 0.0], array![1.0, 0.0]);
            assert!(history.len() <= 3);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.s[0][0], 8.0);
        assert_eq!(history.s[2][0], 10.0);
        assert_eq!(history.rho[0], 8.0);
    }

    #[test]
    fn empty_history_leaves_direction_unchanged() {
        let history = CorrectionHistory::new(5);
        let mut dir = array![1.0, -2.0];
        history.map_direction(&mut dir);
        assert_eq!(dir, array![1.0, -2.0]);
        assert!(history.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // With a single correction, the recursion equals the explicit BFGS
    // update of `H₀ = γI`, `γ = ρ / (y·y)`:
    // `H = (I − ρ⁻¹ s yᵀ) H₀ (I − ρ⁻¹ y sᵀ) + ρ⁻¹ s sᵀ`.
    fn single_correction_matches_explicit_bfgs_update() {
        // Arrange
        let s = array![1.0, 0.5];
        let y = array![2.0, 0.25];
        let mut history = CorrectionHistory::new(4);
        history.push(s.clone(), y.clone());
        let rho = s.dot(&y);
        let gamma = rho / y.dot(&y);
        let eye = Array2::<f64>::eye(2);
        let s_col = s.clone().insert_axis(ndarray::Axis(1));
        let y_col = y.clone().insert_axis(ndarray::Axis(1));
        let left = &eye - &(s_col.dot(&y_col.t()) / rho);
        let right = &eye - &(y_col.dot(&s_col.t()) / rho);
        let h = left.dot(&(&eye * gamma)).dot(&right) + s_col.dot(&s_col.t()) / rho;
        let g = array![0.3, -0.7];

        // Act
        let mut dir = -&g;
        history.map_direction(&mut dir);

        // Assert
        let expected = -h.dot(&g);
        assert_abs_diff_eq!(dir[0], expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(dir[1], expected[1], epsilon = 1e-12);
    }
}
