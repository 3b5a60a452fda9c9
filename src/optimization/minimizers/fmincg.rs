//! fmincg — nonlinear conjugate gradient with a Wolfe-Powell line search.
//!
//! Purpose
//! -------
//! Minimize a differentiable objective with Polack-Ribière conjugate
//! directions. Each line search brackets a step along the current direction
//! with cubic/quadratic interpolation and cubic extrapolation until the
//! Wolfe-Powell conditions hold.
//!
//! Key behaviors
//! -------------
//! - Initial step `z1 = red / (1 − d1)` where `d1` is the slope along the
//!   search direction `s` (initially `−∇c`).
//! - While the trial point violates sufficient decrease (`RHO`) or the
//!   curvature bound (`SIG`) and evaluations remain (`M > 0`), the bracket is
//!   shrunk by interpolation; non-finite fits fall back to bisection.
//! - A valid point is then extrapolated (clamped by `limit`, `EXT`, `INT`)
//!   until success (`d2 > SIG·d1`) or the bracket budget is spent.
//! - On success the Polack-Ribière direction is formed and the next initial
//!   step is capped at `RATIO` times the slope ratio. On failure θ and the
//!   cost are restored; a second consecutive failure or an exhausted budget
//!   ends the run, otherwise the search restarts from steepest descent.
//!
//! Invariants & assumptions
//! ------------------------
//! - At most `MAX` evaluations are spent resolving one bracket (plus the
//!   single evaluation of the initial trial point).
//! - A positive run length counts line searches, a negative one counts
//!   objective evaluations ([`FmincgBudget`]).
//! - Line-search exhaustion is a normal stop, never an error.
//!
//! Conventions
//! -----------
//! - All per-run state lives in `FmincgState`, created fresh per call.
//! - Iterations reported to listeners are successful line searches.
//!
//! Testing notes
//! -------------
//! - Unit tests cover convergence on quadratics and Rosenbrock, the bracket
//!   evaluation bound, evaluation-counting mode, and listener stops.
use std::sync::Arc;

use crate::optimization::{
    errors::OptResult,
    minimizers::common::{IterationReporter, ListenerSlot, evaluate_checked},
    objective::{
        traits::{IterationListener, Minimizer, Objective},
        types::{Grad, Theta},
        validation::validate_theta0,
    },
};

/// Sufficient-decrease constant.
pub const RHO: f64 = 0.01;
/// Curvature constant.
pub const SIG: f64 = 0.5;
/// Do not re-evaluate within `INT` of the current bracket edges.
pub const INT: f64 = 0.1;
/// Extrapolate at most `EXT` times the current step.
pub const EXT: f64 = 3.0;
/// Maximum evaluations per line-search bracket.
pub const MAX: i64 = 20;
/// Maximum allowed slope ratio for the next initial step.
pub const RATIO: f64 = 100.0;
/// Expected reduction in the first line search.
const RED: f64 = 1.0;

/// What the run length counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FmincgBudget {
    /// `max_iterations` bounds the number of line searches.
    #[default]
    Iterations,
    /// `max_iterations` bounds the number of objective evaluations.
    Evaluations,
}

#[derive(Debug, Clone, Default)]
pub struct Fmincg {
    budget: FmincgBudget,
    listener: ListenerSlot,
}

impl Fmincg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count objective evaluations instead of line searches.
    pub fn counting_evaluations() -> Self {
        Self { budget: FmincgBudget::Evaluations, ..Self::default() }
    }

    pub fn with_listener(mut self, listener: Arc<dyn IterationListener>) -> Self {
        self.listener = ListenerSlot(Some(listener));
        self
    }

    pub fn budget(&self) -> FmincgBudget {
        self.budget
    }

    /// Run with a signed length: `length > 0` bounds line searches,
    /// `length < 0` bounds objective evaluations at `|length|`.
    ///
    /// # Errors
    /// Invalid `theta0`, or any error raised by the objective.
    pub fn minimize_with_length(
        &self, objective: &dyn Objective, theta0: Theta, length: i64, verbose: bool,
    ) -> OptResult<Theta> {
        validate_theta0(&theta0)?;
        let reporter = IterationReporter::new("Fmincg", verbose, &self.listener);
        let mut search = LineSearcher { objective, length, i: 0 };
        let budget = length.abs();

        let first = search.evaluate(&theta0)?;
        let s = -&first.1;
        let d1 = -s.dot(&s);
        let z1 = RED / (1.0 - d1);
        let mut st = FmincgState { x: theta0, f1: first.0, df1: first.1, s, d1, z1 };
        let mut ls_failed = false;
        let mut successes = 0;

        while search.i < budget {
            if length > 0 {
                search.i += 1;
            }
            let x0 = st.x.clone();
            let f0 = st.f1;
            let df0 = st.df1.clone();

            let outcome = search.line_search(&mut st)?;
            if outcome.success {
                st.f1 = outcome.f2;
                let keep_going = reporter.finished(successes, st.f1, &st.x);
                successes += 1;

                let df2 = outcome.df2;
                let beta = (df2.dot(&df2) - st.df1.dot(&df2)) / st.df1.dot(&st.df1);
                st.s = &st.s * beta - &df2;
                st.df1 = df2;
                let mut d2 = st.df1.dot(&st.s);
                if d2 > 0.0 {
                    st.s = -&st.df1;
                    d2 = -st.s.dot(&st.s);
                }
                st.z1 *= RATIO.min(st.d1 / (d2 - f64::MIN_POSITIVE));
                st.d1 = d2;
                ls_failed = false;
                if !keep_going {
                    break;
                }
            } else {
                st.x = x0;
                st.f1 = f0;
                st.df1 = df0;
                if ls_failed || search.i > budget {
                    log::debug!("Fmincg: line search failed twice or budget spent; stopping");
                    break;
                }
                log::debug!(
                    "Fmincg: line search failed after {} bracket evaluations; \
                     restarting from steepest descent",
                    outcome.bracket_evaluations
                );
                // Derivatives are swapped with the last evaluated point.
                st.df1 = outcome.df2;
                st.s = -&st.df1;
                st.d1 = -st.s.dot(&st.s);
                st.z1 = 1.0 / (1.0 - st.d1);
                ls_failed = true;
            }
        }
        Ok(st.x)
    }
}

impl Minimizer for Fmincg {
    /// `max_iterations` counts line searches, or evaluations when built with
    /// [`Fmincg::counting_evaluations`].
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta> {
        let length = i64::try_from(max_iterations).unwrap_or(i64::MAX);
        let length = match self.budget {
            FmincgBudget::Iterations => length,
            FmincgBudget::Evaluations => -length,
        };
        self.minimize_with_length(objective, theta0, length, verbose)
    }
}

/// Per-run state: current point, its cost/gradient, direction and step.
#[derive(Debug, Clone)]
pub(crate) struct FmincgState {
    x: Theta,
    f1: f64,
    df1: Grad,
    s: Grad,
    d1: f64,
    z1: f64,
}

/// Result of one line search along `s`.
#[derive(Debug)]
pub(crate) struct LineSearchOutcome {
    success: bool,
    f2: f64,
    df2: Grad,
    /// Evaluations spent inside the bracketing loops (excludes the initial trial).
    bracket_evaluations: i64,
}

/// Objective handle plus the signed run-length counter `i`.
struct LineSearcher<'o> {
    objective: &'o dyn Objective,
    length: i64,
    i: i64,
}

impl LineSearcher<'_> {
    fn evaluate(&mut self, x: &Theta) -> OptResult<(f64, Grad)> {
        let out = evaluate_checked(self.objective, x)?;
        if self.length < 0 {
            self.i += 1;
        }
        Ok((out.cost, out.gradient))
    }

    /// Wolfe-Powell line search along `st.s` starting from `st.x`.
    ///
    /// Moves `st.x` to the last evaluated point and updates `st.z1` to the
    /// total step taken.
    fn line_search(&mut self, st: &mut FmincgState) -> OptResult<LineSearchOutcome> {
        st.x.scaled_add(st.z1, &st.s);
        let (mut f2, mut df2) = self.evaluate(&st.x)?;
        let mut d2 = df2.dot(&st.s);
        let mut f3 = st.f1;
        let mut d3 = st.d1;
        let mut z3 = -st.z1;
        let mut m = if self.length > 0 { MAX } else { MAX.min(-self.length - self.i) };
        let mut limit = -1.0;
        let mut bracket_evaluations = 0;

        let success = loop {
            while (f2 > st.f1 + st.z1 * RHO * st.d1 || d2 > -SIG * st.d1) && m > 0 {
                limit = st.z1;
                let mut z2 = if f2 > st.f1 {
                    // quadratic fit
                    z3 - (0.5 * d3 * z3 * z3) / (d3 * z3 + f2 - f3)
                } else {
                    // cubic fit
                    let a = 6.0 * (f2 - f3) / z3 + 3.0 * (d2 + d3);
                    let b = 3.0 * (f3 - f2) - z3 * (d3 + 2.0 * d2);
                    ((b * b - a * d2 * z3 * z3).sqrt() - b) / a
                };
                if !z2.is_finite() {
                    z2 = z3 / 2.0;
                }
                z2 = z2.min(INT * z3).max((1.0 - INT) * z3);
                st.z1 += z2;
                st.x.scaled_add(z2, &st.s);
                (f2, df2) = self.evaluate(&st.x)?;
                m -= 1;
                bracket_evaluations += 1;
                d2 = df2.dot(&st.s);
                z3 -= z2;
            }

            if f2 > st.f1 + st.z1 * RHO * st.d1 || d2 > -SIG * st.d1 {
                break false;
            }
            if d2 > SIG * st.d1 {
                break true;
            }
            if m == 0 {
                break false;
            }

            // cubic extrapolation
            let a = 6.0 * (f2 - f3) / z3 + 3.0 * (d2 + d3);
            let b = 3.0 * (f3 - f2) - z3 * (d3 + 2.0 * d2);
            let mut z2 = -d2 * z3 * z3 / (b + (b * b - a * d2 * z3 * z3).sqrt());
            if !z2.is_finite() || z2 < 0.0 {
                z2 = if limit < -0.5 { st.z1 * (EXT - 1.0) } else { (limit - st.z1) / 2.0 };
            } else if limit > -0.5 && z2 + st.z1 > limit {
                z2 = (limit - st.z1) / 2.0;
            } else if limit < -0.5 && z2 + st.z1 > st.z1 * EXT {
                z2 = st.z1 * (EXT - 1.0);
            } else if z2 < -z3 * INT {
                z2 = -z3 * INT;
            } else if limit > -0.5 && z2 < (limit - st.z1) * (1.0 - INT) {
                z2 = (limit - st.z1) * (1.0 - INT);
            }
            f3 = f2;
            d3 = d2;
            z3 = -z2;
            st.z1 += z2;
            st.x.scaled_add(z2, &st.s);
            (f2, df2) = self.evaluate(&st.x)?;
            m -= 1;
            bracket_evaluations += 1;
            d2 = df2.dot(&st.s);
        };

        Ok(LineSearchOutcome { success, f2, df2, bracket_evaluations })
    }
}

/// Fresh state at `x` along steepest descent, as at the start of a run.
#[cfg(test)]
fn steepest_state(objective: &dyn Objective, x: Theta) -> OptResult<FmincgState> {
    let out = evaluate_checked(objective, &x)?;
    let s = -&out.gradient;
    let d1 = -s.dot(&s);
    Ok(FmincgState { x, f1: out.cost, df1: out.gradient, s, d1, z1: RED / (1.0 - d1) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::objective::types::CostGradient;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rosenbrock(theta: &Theta) -> OptResult<CostGradient> {
        let (x, y) = (theta[0], theta[1]);
        let cost = (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2);
        let gradient =
            array![-2.0 * (1.0 - x) - 400.0 * x * (y - x * x), 200.0 * (y - x * x)];
        Ok(CostGradient::new(cost, gradient))
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence on a shifted 1-D quadratic and on Rosenbrock.
    // - The per-bracket evaluation bound on a badly scaled objective.
    // - Evaluation-counting mode (negative length).
    // - Listener stop and failure propagation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Fmincg finds the minimum of `(4 − x)² + 10` from x = −5.
    //
    // Expect
    // ------
    // - x ≈ 4 and cost ≈ 10.
    fn converges_on_shifted_parabola() {
        // Arrange
        let f = |theta: &Theta| -> OptResult<CostGradient> {
            let d = 4.0 - theta[0];
            Ok(CostGradient::new(d * d + 10.0, array![-2.0 * d]))
        };

        // Act
        let theta = Fmincg::new().minimize(&f, array![-5.0], 100, false).expect("run");

        // Assert
        assert_abs_diff_eq!(theta[0], 4.0, epsilon = 1e-6);
        let cost = f(&theta).expect("cost").cost;
        assert_abs_diff_eq!(cost, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn converges_on_rosenbrock() {
        let theta = Fmincg::new().minimize(&rosenbrock, array![-1.2, 1.0], 500, false).expect("run");
        assert_abs_diff_eq!(theta[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(theta[1], 1.0, epsilon = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // A single line search never spends more than `MAX` evaluations in its
    // bracket, even when the initial step is wildly off scale.
    //
    // Given
    // -----
    // - `c(x) = 1e6·x⁴` from x = 10, where the first step overshoots badly.
    //
    // Expect
    // ------
    // - `bracket_evaluations <= MAX` and the objective was called at most
    //   `MAX + 1` times during the search.
    fn line_search_respects_bracket_budget() {
        // Arrange
        let calls = AtomicUsize::new(0);
        let steep = |theta: &Theta| -> OptResult<CostGradient> {
            calls.fetch_add(1, Ordering::SeqCst);
            let x = theta[0];
            Ok(CostGradient::new(1e6 * x.powi(4), array![4e6 * x.powi(3)]))
        };
        let mut st = steepest_state(&steep, array![10.0]).expect("initial state");
        let mut searcher = LineSearcher { objective: &steep, length: 100, i: 0 };
        calls.store(0, Ordering::SeqCst);

        // Act
        let outcome = searcher.line_search(&mut st).expect("line search");

        // Assert
        assert!(outcome.bracket_evaluations <= MAX);
        assert!(calls.load(Ordering::SeqCst) as i64 <= MAX + 1);
    }

    #[test]
    // Purpose
    // -------
    // Successive steepest-descent line searches on Rosenbrock each stay
    // within the bracket budget.
    fn evaluations_between_iterations_are_bounded() {
        let calls = AtomicUsize::new(0);
        let counted = |theta: &Theta| -> OptResult<CostGradient> {
            calls.fetch_add(1, Ordering::SeqCst);
            rosenbrock(theta)
        };
        let mut st = steepest_state(&counted, array![-1.2, 1.0]).expect("initial state");
        let mut searcher = LineSearcher { objective: &counted, length: 200, i: 0 };
        for _ in 0..50 {
            let outcome = searcher.line_search(&mut st).expect("line search");
            assert!(outcome.bracket_evaluations <= MAX);
            if !outcome.success {
                break;
            }
            st.f1 = outcome.f2;
            st.s = -&outcome.df2;
            st.df1 = outcome.df2;
            st.d1 = -st.s.dot(&st.s);
            st.z1 = 1.0 / (1.0 - st.d1);
        }
    }

    #[test]
    // Purpose
    // -------
    // With a negative length the run stops once |length| evaluations are used.
    fn negative_length_counts_evaluations() {
        // Arrange
        let calls = AtomicUsize::new(0);
        let counted = |theta: &Theta| -> OptResult<CostGradient> {
            calls.fetch_add(1, Ordering::SeqCst);
            rosenbrock(theta)
        };

        // Act
        let _ = Fmincg::counting_evaluations()
            .minimize(&counted, array![-1.2, 1.0], 25, false)
            .expect("run");

        // Assert
        assert!(calls.load(Ordering::SeqCst) <= 25);
    }

    #[test]
    fn listener_stops_after_first_success() {
        let fmincg = Fmincg::new().with_listener(Arc::new(|_: usize, _: f64, _: &Theta| false));
        let theta = fmincg.minimize(&rosenbrock, array![-1.2, 1.0], 100, false).expect("run");
        let start_cost = rosenbrock(&array![-1.2, 1.0]).expect("cost").cost;
        assert!(rosenbrock(&theta).expect("cost").cost < start_cost);
    }

    #[test]
    fn zero_length_returns_start() {
        let theta = Fmincg::new().minimize(&rosenbrock, array![0.5, 0.5], 0, false).expect("run");
        assert_eq!(theta, array![0.5, 0.5]);
    }
}
