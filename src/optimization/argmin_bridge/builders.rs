//! L-BFGS solver construction for the argmin bridge.
//!
//! Two line searches are supported, each with its own concrete solver type;
//! tolerance wiring is shared through [`configure_lbfgs`].
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};

use crate::optimization::{
    argmin_bridge::lbfgs::ArgminLbfgs,
    errors::OptResult,
    objective::types::{Cost, Grad, Theta},
};

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// build_optimizer_hager_zhang — construct L-BFGS with Hager–Zhang line search.
///
/// Parameters
/// ----------
/// - `config`: `&ArgminLbfgs`
///   Consults `history_size` (the L-BFGS memory `m`) and the optional
///   `tol_grad` / `tol_cost` stopping tolerances.
///
/// Returns
/// -------
/// `OptResult<LbfgsHagerZhang>`
///   - `Ok(solver)` ready to be handed to [`run_lbfgs`](super::run::run_lbfgs).
///   - `Err(e)` if argmin rejects a tolerance.
///
/// Notes
/// -----
/// - `θ0` and the iteration limit are applied by the runner, not here.
pub fn build_optimizer_hager_zhang(config: &ArgminLbfgs) -> OptResult<LbfgsHagerZhang> {
    let lbfgs = LbfgsHagerZhang::new(HagerZhangLS::new(), config.history_size);
    configure_lbfgs(lbfgs, config)
}

/// build_optimizer_more_thuente — construct L-BFGS with More–Thuente line search.
///
/// Same contract as [`build_optimizer_hager_zhang`].
pub fn build_optimizer_more_thuente(config: &ArgminLbfgs) -> OptResult<LbfgsMoreThuente> {
    let lbfgs = LbfgsMoreThuente::new(MoreThuenteLS::new(), config.history_size);
    configure_lbfgs(lbfgs, config)
}

/// Apply the optional gradient-norm and cost-change tolerances.
///
/// # Errors
/// `OptError` (via `From<argmin::core::Error>`) when argmin rejects a value.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, config: &ArgminLbfgs,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = config.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = config.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::argmin_bridge::lbfgs::LineSearcher;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction with both line searches.
    // - Tolerance wiring with and without values.
    //
    // They intentionally DO NOT cover:
    // - Executor behavior, which is exercised through `ArgminLbfgs::minimize`.
    // -------------------------------------------------------------------------

    #[test]
    fn builds_both_line_searches() {
        let config = ArgminLbfgs::default();
        assert!(build_optimizer_more_thuente(&config).is_ok());
        assert!(build_optimizer_hager_zhang(&config).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // `configure_lbfgs` accepts a config with no tolerances at all and one
    // with both set.
    fn configure_accepts_optional_tolerances() {
        let bare = ArgminLbfgs::new(LineSearcher::HagerZhang, 3, None, None).expect("valid config");
        assert!(build_optimizer_hager_zhang(&bare).is_ok());

        let tight = ArgminLbfgs::new(LineSearcher::MoreThuente, 5, Some(1e-10), Some(1e-12))
            .expect("valid config");
        assert!(build_optimizer_more_thuente(&tight).is_ok());
    }
}
