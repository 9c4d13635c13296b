//! Implicit finite-difference solver for 1-D transient heat conduction.
//!
//! Each timestep is a backward Euler step driven to convergence by a
//! Newton-Raphson iteration on a tridiagonal system. The only nonlinearity is
//! the optional Stefan-Boltzmann radiative loss at `x = 0`.

pub mod config;
pub mod discretization;
pub mod logging;
pub mod models;
pub mod numerics;
pub mod physics;
pub mod processing;

use crate::config::SimulationConfig;
use crate::numerics::solver::SolverError;
use crate::numerics::transient::{SimulationResult, TransientSolver};

/// Validate `config` and march it through every timestep.
pub fn solve(config: &SimulationConfig) -> Result<SimulationResult, SolverError> {
    let solver = TransientSolver::new(config.clone())?;
    solver.run()
}
