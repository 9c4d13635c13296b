use nalgebra::{DMatrix, DVector};
use serde::Serialize;

/// Diagnostic entry written once per finalized timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    /// Physical time at the end of the step in s
    pub time: f64,
    /// Newton corrections applied
    pub iterations: u32,
    /// Residual 2-norm of the committed iterate
    pub residual: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepLog {
    records: Vec<StepRecord>,
}

impl StepLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter()
    }

    pub fn total_iterations(&self) -> u64 {
        self.records.iter().map(|r| r.iterations as u64).sum()
    }

    pub fn max_iterations(&self) -> u32 {
        self.records.iter().map(|r| r.iterations).max().unwrap_or(0)
    }

    pub fn worst_residual(&self) -> f64 {
        self.records.iter().map(|r| r.residual).fold(0.0, f64::max)
    }

    pub fn unconverged_steps(&self) -> usize {
        self.records.iter().filter(|r| !r.converged).count()
    }
}

/// Space-time temperature field: one row per node, one column per timestep,
/// column 0 holding the initial condition.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureProfile {
    values: DMatrix<f64>,
    positions: Vec<f64>,
    dt: f64,
    filled: usize,
}

impl TemperatureProfile {
    pub fn new(initial: &DVector<f64>, positions: Vec<f64>, dt: f64, num_steps: usize) -> Self {
        let mut values = DMatrix::zeros(initial.len(), num_steps + 1);
        values.set_column(0, initial);
        Self {
            values,
            positions,
            dt,
            filled: 1,
        }
    }

    /// Write column `step`. Columns are committed once each, in order.
    pub fn commit(&mut self, step: usize, temperatures: &DVector<f64>) {
        debug_assert_eq!(step, self.filled, "profile columns are written in order");
        self.values.set_column(step, temperatures);
        self.filled = step + 1;
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn num_nodes(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.values.ncols()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn times(&self) -> Vec<f64> {
        (0..self.num_columns()).map(|t| t as f64 * self.dt).collect()
    }

    pub fn column(&self, step: usize) -> DVector<f64> {
        self.values.column(step).into_owned()
    }

    pub fn final_temperature(&self) -> DVector<f64> {
        self.column(self.num_columns() - 1)
    }

    /// Temperature trace of one node across time, as a thermocouple would see it.
    pub fn node_history(&self, node: usize) -> Vec<f64> {
        self.values.row(node).iter().copied().collect()
    }

    pub fn nearest_node(&self, x: f64) -> usize {
        self.positions
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
            .map_or(0, |(i, _)| i)
    }

    pub fn at_position(&self, x: f64) -> Vec<f64> {
        self.node_history(self.nearest_node(x))
    }

    /// Column index whose time is closest to `time`, clamped to the run.
    pub fn nearest_column(&self, time: f64) -> usize {
        let idx = (time / self.dt).round();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.num_columns() - 1)
        }
    }

    pub fn min_max(&self) -> (f64, f64) {
        (self.values.min(), self.values.max())
    }
}
