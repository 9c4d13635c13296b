use crate::config::{ConfigError, SimulationConfig};
use crate::numerics::history::{StepLog, StepRecord, TemperatureProfile};
use crate::numerics::solver::{NewtonOutcome, NewtonSolver, SolverError};
use crate::numerics::timing::{finalize_and_log, reset_timing};
use crate::numerics::{NonConvergencePolicy, SolverConfig};
use crate::physics::HeatProblem;
use crate::physics::assembly::Assembler;
use log::{debug, info, warn};
use nalgebra::DVector;
use std::ops::ControlFlow;
use std::time::Instant;

/// Mutable record threaded through the time loop.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Current Newton iterate.
    pub t: DVector<f64>,
    /// Field at the start of the current timestep; frozen while it iterates.
    pub t_old: DVector<f64>,
    pub profile: TemperatureProfile,
    pub log: StepLog,
}

impl SimulationState {
    pub fn new(problem: &HeatProblem, solver: &SolverConfig) -> Self {
        let initial = problem.initial_condition();
        let profile = TemperatureProfile::new(
            &initial,
            problem.grid.positions(),
            solver.delta_time,
            solver.number_of_time_steps,
        );
        Self {
            t: initial.clone(),
            t_old: initial,
            profile,
            log: StepLog::with_capacity(solver.number_of_time_steps),
        }
    }

    /// Finalize `step`: the iterate becomes the baseline of the next step and
    /// fills its profile column.
    fn commit(&mut self, step: usize, time: f64, outcome: &NewtonOutcome) -> StepRecord {
        self.t_old.copy_from(&self.t);
        self.profile.commit(step, &self.t);
        let record = StepRecord {
            step,
            time,
            iterations: outcome.iterations,
            residual: outcome.final_residual,
            converged: outcome.converged(),
        };
        self.log.push(record.clone());
        record
    }
}

/// Everything a finished run hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub profile: TemperatureProfile,
    pub log: StepLog,
}

/// Backward Euler time marching with one Newton solve per step.
pub struct TransientSolver {
    config: SimulationConfig,
    problem: HeatProblem,
    newton: NewtonSolver,
}

impl TransientSolver {
    /// Validates the configuration; no simulation work happens here.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.solver.validate()?;
        let problem = HeatProblem::from_config(&config)?;
        let newton = NewtonSolver::from_config(&config.solver);
        Ok(Self {
            config,
            problem,
            newton,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn problem(&self) -> &HeatProblem {
        &self.problem
    }

    pub fn run(&self) -> Result<SimulationResult, SolverError> {
        self.run_with_observer(|_, _| ControlFlow::Continue(()))
    }

    /// March every timestep in order. `observer` sees each finalized step and
    /// may stop the run by returning `Break`, in which case no result is
    /// returned.
    pub fn run_with_observer<F>(&self, mut observer: F) -> Result<SimulationResult, SolverError>
    where
        F: FnMut(&StepRecord, &DVector<f64>) -> ControlFlow<()>,
    {
        let solver = &self.config.solver;
        let dt = solver.delta_time;
        let num_steps = solver.number_of_time_steps;

        reset_timing();
        let start = Instant::now();

        info!(
            "Heat conduction solver: {} nodes, dx = {:.3e} m, {} steps of {:.3e} s",
            self.problem.num_nodes(),
            self.problem.grid.dx,
            num_steps,
            dt
        );
        if self.config.show_progress {
            info!(" [Step] [Physical Time] [Iteration] [Residue]");
        }

        let mut state = SimulationState::new(&self.problem, solver);

        for step in 1..=num_steps {
            let assembler = Assembler::new(&self.problem, dt, step, &state.t_old);
            let outcome = self.newton.solve_step(&assembler, &mut state.t)?;
            let time = solver.time_at(step);

            if !outcome.converged() {
                match solver.non_convergence {
                    NonConvergencePolicy::Fail => {
                        return Err(SolverError::NonConvergence {
                            step,
                            iterations: outcome.iterations,
                            residual_norm: outcome.final_residual,
                        });
                    }
                    NonConvergencePolicy::ContinueWithLastIterate => {
                        warn!(
                            "step {step} (t = {time:.3}s) kept after {} iterations with residual {:.3e}",
                            outcome.iterations, outcome.final_residual
                        );
                    }
                }
            }

            let record = state.commit(step, time, &outcome);
            debug!(
                "step {step} committed: t = {time:.4e}s, {} iterations, residual {:.3e}",
                record.iterations, record.residual
            );
            if self.config.show_progress {
                info!(
                    " [{:>4}] [{:>13.2}] [{:>9}] [{:>8.2e}]",
                    step, time, record.iterations, record.residual
                );
            }

            if observer(&record, &state.t).is_break() {
                info!("run cancelled after step {step}");
                return Err(SolverError::Cancelled {
                    completed_steps: step,
                });
            }
        }

        let elapsed = start.elapsed();
        finalize_and_log(elapsed);
        info!("[Cost] CPU time spent {:.3} s", elapsed.as_secs_f64());

        Ok(SimulationResult {
            profile: state.profile,
            log: state.log,
        })
    }
}
