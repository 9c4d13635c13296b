use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numerics::SolverConfig;
use crate::physics::bc::{BoundaryConfig, BoundarySide, Radiation};
use crate::physics::{HeatProblem, MaterialProperties};

/// Problems detected while loading or validating a configuration, before any
/// simulation work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown boundary kind `{0}` (expected `heatFlux` or `fixedTemperature`)")]
    UnknownBoundaryKind(String),
    #[error("grid needs at least 3 nodes, got {0}")]
    TooFewNodes(usize),
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{side} boundary has {actual} prescribed values but the run has {expected} timesteps")]
    SeriesLengthMismatch {
        side: BoundarySide,
        expected: usize,
        actual: usize,
    },
    #[error("{side} boundary value for timestep {step} is not finite")]
    NonFiniteBoundaryValue { side: BoundarySide, step: usize },
    #[error("radiative loss needs a heat-flux boundary at x=0")]
    RadiationNeedsHeatFlux,
    #[error("emissivity must lie in [0, 1], got {0}")]
    InvalidEmissivity(f64),
    #[error("relaxation must lie in (0, 1], got {0}")]
    InvalidRelaxation(f64),
    #[error("number of timesteps must be at least 1")]
    NoTimeSteps,
    #[error("maximum Newton iterations must be at least 1")]
    NoIterations,
    #[error("initial temperature must be finite, got {0}")]
    NonFiniteInitialTemperature(f64),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Complete input record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Domain length in m
    pub length: f64,
    pub number_of_nodes: usize,
    pub material: MaterialProperties,
    /// Uniform initial temperature in K
    pub initial_temperature: f64,
    pub boundary_x0: BoundaryConfig,
    pub boundary_xl: BoundaryConfig,
    /// Radiative loss at x=0; `None` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiation: Option<Radiation>,
    pub solver: SolverConfig,
    /// Log one progress line per timestep at info level.
    #[serde(default)]
    pub show_progress: bool,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver.validate()?;
        HeatProblem::from_config(self).map(|_| ())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::NonConvergencePolicy;
    use crate::physics::bc::{BoundaryKind, BoundaryValues};

    const SAMPLE: &str = r#"{
        "length": 0.05,
        "number_of_nodes": 101,
        "material": {
            "name": "steel",
            "conductivity": 60.5,
            "density": 7850.0,
            "heat_capacity": 434.0
        },
        "initial_temperature": 298.0,
        "boundary_x0": { "kind": "heatFlux", "values": 750000.0 },
        "boundary_xl": { "kind": "fixedTemperature", "values": [298.0, 299.0, 300.0] },
        "radiation": { "emissivity": 0.7 },
        "solver": {
            "delta_time": 0.2,
            "number_of_time_steps": 3,
            "max_iteration": 20,
            "convergence_tolerance": 1e-6,
            "non_convergence": "continue_with_last_iterate"
        }
    }"#;

    #[test]
    fn parses_json_with_defaults() {
        let cfg = SimulationConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(cfg.boundary_x0.kind, BoundaryKind::HeatFlux);
        assert_eq!(cfg.boundary_x0.values, BoundaryValues::Constant(750000.0));
        assert_eq!(
            cfg.boundary_xl.values,
            BoundaryValues::Series(vec![298.0, 299.0, 300.0])
        );
        assert_eq!(cfg.radiation, Some(Radiation { emissivity: 0.7 }));
        assert_eq!(cfg.solver.relaxation, 1.0);
        assert_eq!(
            cfg.solver.non_convergence,
            NonConvergencePolicy::ContinueWithLastIterate
        );
        assert!(!cfg.show_progress);
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let cfg = SimulationConfig::from_json_str(SAMPLE).unwrap();
        let text = cfg.to_json_string().unwrap();
        assert!(text.contains("\"heatFlux\""));
        assert_eq!(SimulationConfig::from_json_str(&text).unwrap(), cfg);
    }

    #[test]
    fn unknown_boundary_kind_is_a_config_error() {
        let text = SAMPLE.replace("\"heatFlux\"", "\"convection\"");
        let err = SimulationConfig::from_json_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("unknown boundary kind `convection`"));
    }

    #[test]
    fn series_length_mismatch_is_caught_on_load() {
        let text = SAMPLE.replace("[298.0, 299.0, 300.0]", "[298.0, 299.0]");
        let err = SimulationConfig::from_json_str(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SeriesLengthMismatch {
                side: BoundarySide::End,
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn radiation_requires_flux_boundary() {
        let text = SAMPLE.replace("\"heatFlux\"", "\"fixedTemperature\"");
        let err = SimulationConfig::from_json_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::RadiationNeedsHeatFlux));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SimulationConfig::from_json_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
