pub mod assembly;
pub mod bc;

use crate::config::{ConfigError, SimulationConfig};
use crate::discretization::grid::Grid;
use crate::physics::bc::{BoundaryCondition, BoundaryKind, BoundarySide, Radiation};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Defines the contract for a discretized model solved by Newton iteration.
pub trait PhysicsModel<T: nalgebra::Scalar> {
    /// Number of unknowns in the discrete system.
    fn num_variables(&self) -> usize;

    /// Calculates the residual vector `F(u)` of the implicit step.
    /// The Newton correction solves `J·du = -F(u)` with `J = ∂F/∂u`.
    /// Generic over `T` so the residual can be differentiated automatically.
    fn calculate_residual(&self, u: &DVector<T>) -> DVector<T>;
}

/// How material properties depend on the state. Only constant properties are
/// modelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialModel {
    #[default]
    Constant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: MaterialModel,
    /// Thermal conductivity W/(m·K)
    pub conductivity: f64,
    /// Density kg/m³
    pub density: f64,
    /// Specific heat J/(kg·K)
    pub heat_capacity: f64,
    /// Explicit diffusivity m²/s, overriding `k/(ρ·cp)` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffusivity: Option<f64>,
}

impl MaterialProperties {
    pub fn new(name: impl Into<String>, conductivity: f64, density: f64, heat_capacity: f64) -> Self {
        Self {
            name: name.into(),
            model: MaterialModel::Constant,
            conductivity,
            density,
            heat_capacity,
            diffusivity: None,
        }
    }

    pub fn with_diffusivity(mut self, diffusivity: f64) -> Self {
        self.diffusivity = Some(diffusivity);
        self
    }

    /// Thermal diffusivity α = k/(ρ·cp) in m²/s, unless overridden.
    pub fn diffusivity(&self) -> f64 {
        self.diffusivity
            .unwrap_or(self.conductivity / (self.density * self.heat_capacity))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("conductivity", self.conductivity)?;
        positive("density", self.density)?;
        positive("heat capacity", self.heat_capacity)?;
        positive("diffusivity", self.diffusivity())
    }
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// A validated conduction problem: grid, constant material, resolved
/// boundary series and initial state. Immutable for the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatProblem {
    pub grid: Grid,
    pub conductivity: f64,
    pub diffusivity: f64,
    pub x0: BoundaryCondition,
    pub xl: BoundaryCondition,
    pub radiation: Option<Radiation>,
    pub initial_temperature: f64,
}

impl HeatProblem {
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let grid = Grid::new(config.length, config.number_of_nodes)?;
        config.material.validate()?;

        let num_steps = config.solver.number_of_time_steps;
        let x0 = BoundaryCondition::from_config(BoundarySide::Start, &config.boundary_x0, num_steps)?;
        let xl = BoundaryCondition::from_config(BoundarySide::End, &config.boundary_xl, num_steps)?;

        if let Some(radiation) = &config.radiation {
            radiation.validate()?;
            if x0.kind != BoundaryKind::HeatFlux {
                return Err(ConfigError::RadiationNeedsHeatFlux);
            }
        }

        if !config.initial_temperature.is_finite() {
            return Err(ConfigError::NonFiniteInitialTemperature(
                config.initial_temperature,
            ));
        }

        Ok(Self {
            grid,
            conductivity: config.material.conductivity,
            diffusivity: config.material.diffusivity(),
            x0,
            xl,
            radiation: config.radiation,
            initial_temperature: config.initial_temperature,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.grid.num_nodes
    }

    /// Uniform initial field.
    pub fn initial_condition(&self) -> DVector<f64> {
        DVector::from_element(self.grid.num_nodes, self.initial_temperature)
    }
}
