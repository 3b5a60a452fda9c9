//! owlqn — limited-memory quasi-Newton with orthant-wise L1 regularization.
//!
//! Purpose
//! -------
//! Minimize `c(θ) + l1weight·‖θ‖₁` where `c` is a smooth [`Objective`]. With
//! `l1weight = 0` this is plain L-BFGS with an Armijo backtracking line
//! search.
//!
//! Key behaviors
//! -------------
//! - Per iteration: pseudo-gradient steepest direction, two-loop mapping
//!   through the bounded [`CorrectionHistory`], sign-fix projection (L1 only),
//!   backtracking line search with orthant snapping, history shift.
//! - Every call to [`Minimizer::minimize`] builds a fresh [`OwlqnState`];
//!   nothing carries over between runs on the same [`Owlqn`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The history holds at most `m` corrections. Pairs with `s·y ≤ 0` are
//!   skipped so the inverse-Hessian approximation stays positive definite.
//! - A chosen direction with a positive (or NaN) directional derivative is a
//!   contract violation and surfaces as [`OptError::NonDescentDirection`].
//!
//! Conventions
//! -----------
//! - Stopping: zero directional derivative (optimum), relative improvement
//!   over a 5-cost window below `tol`, the listener, or `max_iterations`
//!   accepted steps.
//! - Costs reported to listeners and used by the stopping rule include the L1
//!   penalty.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the pseudo-gradient, the sign projection, orthant
//!   snapping, convergence with and without L1, and the non-descent error.
use std::{collections::VecDeque, sync::Arc};

use ndarray::Zip;

mod history;

pub use history::CorrectionHistory;

use crate::optimization::{
    errors::{OptError, OptResult},
    minimizers::common::{IterationReporter, ListenerSlot, evaluate_checked},
    objective::{
        finite_diff::directional_derivative,
        traits::{IterationListener, Minimizer, Objective},
        types::{CostGradient, DEFAULT_HISTORY_SIZE, Grad, Theta},
        validation::{validate_theta0, verify_non_negative, verify_positive},
    },
};

/// Default relative-improvement tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
/// Sufficient-decrease constant of the backtracking line search.
const ARMIJO_C1: f64 = 1e-4;
/// Number of accepted costs compared by the relative-improvement rule.
const IMPROVEMENT_WINDOW: usize = 5;

/// OwlqnOptions — configuration of an [`Owlqn`] run.
///
/// - `m`: correction history size (≥ 1).
/// - `l1weight`: L1 penalty weight (finite, ≥ 0).
/// - `tol`: relative-improvement tolerance (finite, > 0).
/// - `grad_check`: log numeric vs analytic directional derivatives each
///   iteration. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwlqnOptions {
    pub m: usize,
    pub l1weight: f64,
    pub tol: f64,
    pub grad_check: bool,
}

impl Default for OwlqnOptions {
    fn default() -> Self {
        Self { m: DEFAULT_HISTORY_SIZE, l1weight: 0.0, tol: DEFAULT_TOLERANCE, grad_check: false }
    }
}

impl OwlqnOptions {
    /// # Errors
    /// [`OptError::InvalidHistorySize`], [`OptError::InvalidL1Weight`] or
    /// [`OptError::InvalidTolerance`].
    pub fn validate(&self) -> OptResult<()> {
        if self.m == 0 {
            return Err(OptError::InvalidHistorySize {
                size: self.m,
                reason: "History size must be at least 1.",
            });
        }
        verify_non_negative(self.l1weight, |value, reason| OptError::InvalidL1Weight {
            value,
            reason,
        })?;
        verify_positive(self.tol, |tol, reason| OptError::InvalidTolerance { tol, reason })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Owlqn {
    options: OwlqnOptions,
    listener: ListenerSlot,
}

impl Owlqn {
    /// # Errors
    /// Any error from [`OwlqnOptions::validate`].
    pub fn new(options: OwlqnOptions) -> OptResult<Self> {
        options.validate()?;
        Ok(Self { options, listener: ListenerSlot::default() })
    }

    pub fn with_listener(mut self, listener: Arc<dyn IterationListener>) -> Self {
        self.listener = ListenerSlot(Some(listener));
        self
    }

    pub fn options(&self) -> &OwlqnOptions {
        &self.options
    }

    fn report_gradient_check(
        &self, objective: &dyn Objective, state: &OwlqnState, reporter: &IterationReporter<'_>,
    ) {
        let l1 = self.options.l1weight;
        let analytic = state.directional_derivative(l1);
        let augmented = |point: &Theta| -> OptResult<f64> {
            Ok(evaluate_checked(objective, point)?.cost + l1 * l1_norm(point))
        };
        match directional_derivative(augmented, &state.x, &state.dir) {
            Ok(numeric) if reporter.verbose() => log::info!(
                "OWLQN gradient check | Iteration {} | analytic {:.6e} | numeric {:.6e}",
                state.iteration,
                analytic,
                numeric
            ),
            Ok(numeric) => log::debug!(
                "OWLQN gradient check | Iteration {} | analytic {} | numeric {}",
                state.iteration,
                analytic,
                numeric
            ),
            Err(e) => log::warn!("OWLQN gradient check skipped: {e}"),
        }
    }
}

impl Minimizer for Owlqn {
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta> {
        validate_theta0(&theta0)?;
        let reporter = IterationReporter::new("OWLQN", verbose, &self.listener);
        let l1 = self.options.l1weight;
        let initial = evaluate_l1(objective, &theta0, l1)?;
        let mut state = OwlqnState::new(theta0, initial, self.options.m);

        while state.iteration < max_iterations {
            state.update_direction(l1);
            if self.options.grad_check {
                self.report_gradient_check(objective, &state, &reporter);
            }

            let accepted = match state.backtrack(objective, l1)? {
                Step::Accepted(point) => point,
                Step::Optimal => {
                    log::debug!(
                        "OWLQN: zero directional derivative at iteration {}",
                        state.iteration
                    );
                    break;
                }
                Step::Stalled => {
                    log::debug!(
                        "OWLQN: step fell below floating-point resolution at iteration {}",
                        state.iteration
                    );
                    break;
                }
            };

            let improvement = state.relative_improvement(accepted.cost);
            state.shift(accepted);
            let keep_going = reporter.finished(state.iteration, state.value, &state.x);
            state.iteration += 1;
            if improvement < self.options.tol {
                log::debug!(
                    "OWLQN: relative improvement {improvement:e} below tolerance {} after {} iterations",
                    self.options.tol,
                    state.iteration
                );
                break;
            }
            if !keep_going {
                break;
            }
        }
        Ok(state.x)
    }
}

/// Outcome of one backtracking line search.
#[derive(Debug)]
enum Step {
    /// Armijo point found; its cost already includes the L1 penalty.
    Accepted(AcceptedPoint),
    /// Directional derivative is exactly zero.
    Optimal,
    /// θ stopped moving and the promised decrease is not representable.
    Stalled,
}

#[derive(Debug)]
struct AcceptedPoint {
    x: Theta,
    gradient: Grad,
    cost: f64,
}

/// OwlqnState — everything one OWLQN run mutates.
///
/// `grad` is the gradient of the smooth part only; the L1 term enters through
/// the pseudo-gradient and [`OwlqnState::directional_derivative`].
#[derive(Debug, Clone)]
pub(crate) struct OwlqnState {
    x: Theta,
    grad: Grad,
    value: f64,
    steepest: Grad,
    dir: Grad,
    history: CorrectionHistory,
    window: VecDeque<f64>,
    iteration: usize,
}

impl OwlqnState {
    fn new(x: Theta, initial: CostGradient, m: usize) -> Self {
        let dim = x.len();
        Self {
            x,
            grad: initial.gradient,
            value: initial.cost,
            steepest: Grad::zeros(dim),
            dir: Grad::zeros(dim),
            history: CorrectionHistory::new(m),
            window: VecDeque::with_capacity(IMPROVEMENT_WINDOW),
            iteration: 0,
        }
    }

    fn update_direction(&mut self, l1: f64) {
        self.steepest = steepest_descent(&self.x, &self.grad, l1);
        let mut dir = self.steepest.clone();
        self.history.map_direction(&mut dir);
        if l1 > 0.0 {
            fix_dir_signs(&mut dir, &self.steepest);
        }
        self.dir = dir;
    }

    /// One-sided derivative of `c + l1·‖·‖₁` at `x` along `dir`.
    fn directional_derivative(&self, l1: f64) -> f64 {
        if l1 == 0.0 {
            return self.dir.dot(&self.grad);
        }
        Zip::from(&self.dir).and(&self.x).and(&self.grad).fold(0.0, |acc, &d, &x, &g| {
            if d == 0.0 {
                return acc;
            }
            let penalized = if x < 0.0 || (x == 0.0 && d < 0.0) { g - l1 } else { g + l1 };
            acc + d * penalized
        })
    }

    /// `x + alpha·dir`, with coordinates that change sign snapped to zero
    /// when L1 is active.
    fn next_point(&self, alpha: f64, l1: f64) -> Theta {
        let mut new_x = self.x.clone();
        new_x.scaled_add(alpha, &self.dir);
        if l1 > 0.0 {
            Zip::from(&mut new_x).and(&self.x).for_each(|nx, &x| {
                if x * *nx < 0.0 {
                    *nx = 0.0;
                }
            });
        }
        new_x
    }

    fn backtrack(&self, objective: &dyn Objective, l1: f64) -> OptResult<Step> {
        let deriv = self.directional_derivative(l1);
        if deriv.is_nan() || deriv > 0.0 {
            return Err(OptError::NonDescentDirection {
                directional_derivative: deriv,
                reason: "Search direction points uphill; check the gradient implementation.",
            });
        }
        if deriv == 0.0 {
            return Ok(Step::Optimal);
        }

        let (initial_alpha, backoff) = if self.iteration == 0 {
            (1.0 / self.dir.dot(&self.dir).sqrt(), 0.1)
        } else {
            (1.0, 0.5)
        };
        let mut alpha = initial_alpha;
        let mut moved = false;
        loop {
            let new_x = self.next_point(alpha, l1);
            if new_x == self.x {
                // Every trial point failed Armijo although the first one
                // promised a decrease the cost could represent.
                let promised = self.value + ARMIJO_C1 * initial_alpha * deriv;
                if moved && promised < self.value {
                    return Err(OptError::NonDescentDirection {
                        directional_derivative: deriv,
                        reason: "Line search found no decrease along the direction; \
                                 the gradient disagrees with the cost.",
                    });
                }
                return Ok(Step::Stalled);
            }
            moved = true;

            let out = evaluate_l1(objective, &new_x, l1)?;
            if out.cost <= self.value + ARMIJO_C1 * deriv * alpha {
                return Ok(Step::Accepted(AcceptedPoint {
                    x: new_x,
                    gradient: out.gradient,
                    cost: out.cost,
                }));
            }
            alpha *= backoff;
        }
    }

    /// Mean relative improvement over the window, `+∞` until it is full.
    /// A zero cost is scaled by the smallest positive `f64` so the result
    /// stays comparable.
    fn relative_improvement(&mut self, value: f64) -> f64 {
        let scale = value.abs().max(f64::MIN_POSITIVE);
        let improvement = if self.window.len() == IMPROVEMENT_WINDOW {
            match self.window.pop_front() {
                Some(oldest) => (oldest - value) / IMPROVEMENT_WINDOW as f64 / scale,
                None => f64::INFINITY,
            }
        } else {
            f64::INFINITY
        };
        self.window.push_back(value);
        improvement
    }

    fn shift(&mut self, accepted: AcceptedPoint) {
        let s = &accepted.x - &self.x;
        let y = &accepted.gradient - &self.grad;
        let curvature = s.dot(&y);
        if curvature > 0.0 {
            self.history.push(s, y);
        } else {
            log::debug!("OWLQN: skipping correction pair with s·y = {curvature:e}");
        }
        self.x = accepted.x;
        self.grad = accepted.gradient;
        self.value = accepted.cost;
    }
}

/// Negated pseudo-gradient of `c + l1·‖·‖₁`.
///
/// At `x_i = 0` the coordinate moves only if `|g_i| > l1`, toward the side
/// that lowers the penalized cost.
fn steepest_descent(x: &Theta, grad: &Grad, l1: f64) -> Grad {
    if l1 == 0.0 {
        return -grad;
    }
    Zip::from(x).and(grad).map_collect(|&x, &g| {
        if x < 0.0 {
            -g + l1
        } else if x > 0.0 {
            -g - l1
        } else if g < -l1 {
            -g - l1
        } else if g > l1 {
            -g + l1
        } else {
            0.0
        }
    })
}

/// Zero every coordinate of `dir` that does not agree in sign with `steepest`.
fn fix_dir_signs(dir: &mut Grad, steepest: &Grad) {
    Zip::from(dir).and(steepest).for_each(|d, &s| {
        if *d * s <= 0.0 {
            *d = 0.0;
        }
    });
}

fn evaluate_l1(objective: &dyn Objective, x: &Theta, l1: f64) -> OptResult<CostGradient> {
    let mut out = evaluate_checked(objective, x)?;
    if l1 > 0.0 {
        out.cost += l1 * l1_norm(x);
    }
    Ok(out)
}

fn l1_norm(x: &Theta) -> f64 {
    x.iter().map(|v| v.abs()).sum()
}
