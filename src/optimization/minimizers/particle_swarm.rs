//! Particle swarm optimization.
//!
//! Gradient-free: only the cost of each [`CostGradient`] is read. Each
//! particle starts at `θ0 + θ0 ⊙ U(0,1)` and moves by
//!
//! `x ← φ·x + α·r₁·(p − x) + β·r₂·(g − x)`
//!
//! with one pair `r₁, r₂ ~ U(0,1)` per particle and sweep, `p` the particle's
//! best position and `g` the swarm's best. The global best starts at θ0 and
//! is returned after `max_iterations` sweeps; there is no convergence test.
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use crate::optimization::{
    errors::{OptError, OptResult},
    minimizers::common::{IterationReporter, ListenerSlot},
    objective::{
        traits::{IterationListener, Minimizer, Objective},
        types::{CostGradient, Theta},
        validation::validate_theta0,
    },
};

#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    num_particles: usize,
    alpha: f64,
    beta: f64,
    phi: f64,
    seed: Option<u64>,
    listener: ListenerSlot,
}

impl ParticleSwarm {
    /// Create a swarm of `num_particles` particles.
    ///
    /// - `alpha`: pull toward the particle's own best.
    /// - `beta`: pull toward the swarm's best.
    /// - `phi`: inertia on the current position.
    ///
    /// # Errors
    /// [`OptError::InvalidParticleCount`] when `num_particles == 0`,
    /// [`OptError::InvalidSwarmCoefficient`] for a non-finite weight.
    pub fn new(num_particles: usize, alpha: f64, beta: f64, phi: f64) -> OptResult<Self> {
        if num_particles == 0 {
            return Err(OptError::InvalidParticleCount {
                count: num_particles,
                reason: "Swarm needs at least one particle.",
            });
        }
        for (name, value) in [("alpha", alpha), ("beta", beta), ("phi", phi)] {
            if !value.is_finite() {
                return Err(OptError::InvalidSwarmCoefficient { name, value });
            }
        }
        Ok(Self { num_particles, alpha, beta, phi, seed: None, listener: ListenerSlot::default() })
    }

    /// Fix the random stream; runs with the same seed are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn IterationListener>) -> Self {
        self.listener = ListenerSlot(Some(listener));
        self
    }

    pub fn num_particles(&self) -> usize {
        self.num_particles
    }

    fn rng(&self) -> Xoshiro256Plus {
        match self.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        }
    }
}

struct Particle {
    position: Theta,
    best_position: Theta,
    best_cost: f64,
}

fn cost_at(objective: &dyn Objective, theta: &Theta) -> OptResult<f64> {
    objective.evaluate_cost(theta).map(|CostGradient { cost, .. }| cost)
}

impl Minimizer for ParticleSwarm {
    fn minimize(
        &self, objective: &dyn Objective, theta0: Theta, max_iterations: usize, verbose: bool,
    ) -> OptResult<Theta> {
        validate_theta0(&theta0)?;
        let reporter = IterationReporter::new("ParticleSwarm", verbose, &self.listener);
        let mut rng = self.rng();

        let mut global_cost = cost_at(objective, &theta0)?;
        let mut global_best = theta0.clone();
        let mut particles = Vec::with_capacity(self.num_particles);
        for _ in 0..self.num_particles {
            let position = theta0.mapv(|x| x + x * rng.r#gen::<f64>());
            let best_cost = cost_at(objective, &position)?;
            if best_cost < global_cost {
                global_best.assign(&position);
                global_cost = best_cost;
            }
            particles.push(Particle { best_position: position.clone(), position, best_cost });
        }

        for iteration in 0..max_iterations {
            for particle in particles.iter_mut() {
                let personal_pull = self.alpha * rng.r#gen::<f64>();
                let global_pull = self.beta * rng.r#gen::<f64>();
                let to_personal = &particle.best_position - &particle.position;
                let to_global = &global_best - &particle.position;
                particle.position *= self.phi;
                particle.position.scaled_add(personal_pull, &to_personal);
                particle.position.scaled_add(global_pull, &to_global);

                let cost = cost_at(objective, &particle.position)?;
                if cost < particle.best_cost {
                    particle.best_position.assign(&particle.position);
                    particle.best_cost = cost;
                    if cost < global_cost {
                        global_best.assign(&particle.position);
                        global_cost = cost;
                    }
                }
            }
            if !reporter.finished(iteration, global_cost, &global_best) {
                break;
            }
        }
        Ok(global_best)
    }
}
