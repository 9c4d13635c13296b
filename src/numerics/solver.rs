use crate::config::ConfigError;
use crate::numerics::SolverConfig;
use crate::numerics::timing::{record_assembly, record_linear_solve};
use crate::numerics::tridiagonal::LinearSolveError;
use crate::physics::assembly::Assembler;
use log::trace;
use nalgebra::DVector;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(
        "linear solve failed at timestep {step}, iteration {iteration} (residual {residual_norm:.3e})"
    )]
    SingularSystem {
        step: usize,
        iteration: u32,
        residual_norm: f64,
        #[source]
        source: LinearSolveError,
    },
    #[error("residual is not finite at timestep {step}, iteration {iteration}")]
    NonFiniteResidual { step: usize, iteration: u32 },
    #[error(
        "Newton's method failed to converge at timestep {step} after {iterations} iterations (residual {residual_norm:.3e})"
    )]
    NonConvergence {
        step: usize,
        iterations: u32,
        residual_norm: f64,
    },
    #[error("run cancelled after timestep {completed_steps}")]
    Cancelled { completed_steps: usize },
}

/// Phase of the Newton iteration within one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonState {
    Iterating,
    Converged,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewtonOutcome {
    /// `Converged` or `Exhausted`.
    pub state: NewtonState,
    /// Newton corrections applied.
    pub iterations: u32,
    /// Residual norm of the final iterate.
    pub final_residual: f64,
    /// Residual norm of every assembled iterate, in order.
    pub history: Vec<f64>,
}

impl NewtonOutcome {
    pub fn converged(&self) -> bool {
        self.state == NewtonState::Converged
    }
}

pub struct NewtonSolver {
    pub tolerance: f64,
    pub max_iterations: u32,
    pub relaxation: f64,
}

impl NewtonSolver {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            tolerance: config.convergence_tolerance,
            max_iterations: config.max_iteration,
            relaxation: config.relaxation,
        }
    }

    /// Drive `u` towards the root of the step residual.
    ///
    /// Up to `max_iterations` relaxed corrections are applied; the residual
    /// of the last iterate is always evaluated so the outcome reports the
    /// norm of what the caller commits.
    pub fn solve_step(
        &self,
        assembler: &Assembler,
        u: &mut DVector<f64>,
    ) -> Result<NewtonOutcome, SolverError> {
        let step = assembler.step();
        let mut state = NewtonState::Iterating;
        let mut iterations = 0;
        let mut res_norm = f64::INFINITY;
        let mut history = Vec::new();

        while state == NewtonState::Iterating {
            let (jacobian, residual) = record_assembly(|| assembler.assemble(u));

            res_norm = residual.norm();
            if !res_norm.is_finite() {
                return Err(SolverError::NonFiniteResidual {
                    step,
                    iteration: iterations,
                });
            }
            history.push(res_norm);
            log_iteration(step, iterations, self.max_iterations, res_norm);

            if res_norm < self.tolerance {
                state = NewtonState::Converged;
            } else if iterations >= self.max_iterations {
                state = NewtonState::Exhausted;
            } else {
                let delta_u = record_linear_solve(|| jacobian.solve(&residual)).map_err(
                    |source| SolverError::SingularSystem {
                        step,
                        iteration: iterations,
                        residual_norm: res_norm,
                        source,
                    },
                )?;
                u.axpy(self.relaxation, &delta_u, 1.0);
                iterations += 1;
            }
        }

        Ok(NewtonOutcome {
            state,
            iterations,
            final_residual: res_norm,
            history,
        })
    }
}

fn log_iteration(step: usize, iteration: u32, max_iter: u32, res_norm: f64) {
    trace!("step {step:>5} | iter {iteration:>3}/{max_iter} | residual {res_norm:>10.3e}");
}
