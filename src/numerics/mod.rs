pub mod history;
pub mod solver;
pub mod timing;
pub mod transient;
pub mod tridiagonal;

use crate::config::ConfigError;
use crate::physics::positive;
use serde::{Deserialize, Serialize};

/// What to do when a timestep uses up its Newton iterations without reaching
/// the tolerance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergencePolicy {
    /// Abort the run with `SolverError::NonConvergence`.
    #[default]
    Fail,
    /// Commit the last iterate, flag the step as unconverged in the log and
    /// carry on with the next timestep.
    ContinueWithLastIterate,
}

/// Time marching and Newton iteration controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Timestep in s
    pub delta_time: f64,
    pub number_of_time_steps: usize,
    /// Newton corrections allowed per timestep
    pub max_iteration: u32,
    /// Bound on the residual 2-norm
    pub convergence_tolerance: f64,
    /// Damping applied to each Newton correction, in (0, 1]
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
    #[serde(default)]
    pub non_convergence: NonConvergencePolicy,
}

fn default_relaxation() -> f64 {
    1.0
}

impl SolverConfig {
    pub fn new(delta_time: f64, number_of_time_steps: usize) -> Self {
        Self {
            delta_time,
            number_of_time_steps,
            max_iteration: 20,
            convergence_tolerance: 1e-8,
            relaxation: default_relaxation(),
            non_convergence: NonConvergencePolicy::Fail,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    pub fn with_max_iteration(mut self, max_iteration: u32) -> Self {
        self.max_iteration = max_iteration;
        self
    }

    pub fn with_relaxation(mut self, relaxation: f64) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_policy(mut self, policy: NonConvergencePolicy) -> Self {
        self.non_convergence = policy;
        self
    }

    /// Physical time at the end of the 1-based timestep `step`.
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.delta_time
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("time step", self.delta_time)?;
        positive("convergence tolerance", self.convergence_tolerance)?;
        if self.number_of_time_steps == 0 {
            return Err(ConfigError::NoTimeSteps);
        }
        if self.max_iteration == 0 {
            return Err(ConfigError::NoIterations);
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(ConfigError::InvalidRelaxation(self.relaxation));
        }
        Ok(())
    }
}
