use std::fmt;
use std::str::FromStr;

use num_dual::DualNum;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Stefan-Boltzmann constant W/(m²·K⁴)
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// Closed set of boundary kinds. Serialized with the names used in parameter
/// files (`heatFlux`, `fixedTemperature`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BoundaryKind {
    /// Prescribed temperature in K.
    FixedTemperature,
    /// Prescribed heat flux into the domain in W/m².
    HeatFlux,
}

impl BoundaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::FixedTemperature => "fixedTemperature",
            BoundaryKind::HeatFlux => "heatFlux",
        }
    }

    /// Ghost node temperature for a prescribed `value` and the first interior
    /// neighbour of the boundary node.
    #[inline]
    pub fn ghost<T: DualNum<f64>>(&self, value: T, neighbor: T, conductivity: f64, dx: f64) -> T {
        match self {
            BoundaryKind::FixedTemperature => fixed_value_ghost(value, neighbor),
            BoundaryKind::HeatFlux => fixed_gradient_ghost(value, conductivity, dx, neighbor),
        }
    }

    /// Jacobian entry coupling a boundary node to its single interior
    /// neighbour, given the interior off-diagonal `temp2 = -α·dt/dx²`.
    #[inline]
    pub fn boundary_coupling(&self, temp2: f64) -> f64 {
        match self {
            BoundaryKind::FixedTemperature => 0.0,
            BoundaryKind::HeatFlux => 2.0 * temp2,
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixedTemperature" => Ok(BoundaryKind::FixedTemperature),
            "heatFlux" => Ok(BoundaryKind::HeatFlux),
            other => Err(ConfigError::UnknownBoundaryKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for BoundaryKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BoundaryKind> for String {
    fn from(kind: BoundaryKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Which end of the rod a boundary sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundarySide {
    /// x = 0
    Start,
    /// x = L
    End,
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySide::Start => f.write_str("x=0"),
            BoundarySide::End => f.write_str("x=L"),
        }
    }
}

/// Prescribed boundary values, either one value held for the whole run or one
/// value per timestep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryValues {
    Constant(f64),
    Series(Vec<f64>),
}

impl From<f64> for BoundaryValues {
    fn from(value: f64) -> Self {
        BoundaryValues::Constant(value)
    }
}

impl From<Vec<f64>> for BoundaryValues {
    fn from(values: Vec<f64>) -> Self {
        BoundaryValues::Series(values)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub kind: BoundaryKind,
    pub values: BoundaryValues,
}

impl BoundaryConfig {
    pub fn heat_flux(values: impl Into<BoundaryValues>) -> Self {
        Self {
            kind: BoundaryKind::HeatFlux,
            values: values.into(),
        }
    }

    pub fn fixed_temperature(values: impl Into<BoundaryValues>) -> Self {
        Self {
            kind: BoundaryKind::FixedTemperature,
            values: values.into(),
        }
    }
}

/// Stefan-Boltzmann loss subtracted from the prescribed flux at x = 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Radiation {
    pub emissivity: f64,
}

impl Radiation {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.emissivity) {
            return Err(ConfigError::InvalidEmissivity(self.emissivity));
        }
        Ok(())
    }

    /// `ε·σ·T⁴` for the current surface temperature.
    #[inline]
    pub fn loss<T: DualNum<f64>>(&self, surface: T) -> T {
        surface.powi(4) * T::from(self.emissivity * STEFAN_BOLTZMANN)
    }
}

/// A boundary whose prescribed values have been checked and expanded to one
/// entry per timestep.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryCondition {
    pub side: BoundarySide,
    pub kind: BoundaryKind,
    values: Vec<f64>,
}

impl BoundaryCondition {
    pub fn from_config(
        side: BoundarySide,
        config: &BoundaryConfig,
        num_steps: usize,
    ) -> Result<Self, ConfigError> {
        let values = match &config.values {
            BoundaryValues::Constant(v) => vec![*v; num_steps],
            BoundaryValues::Series(series) => {
                if series.len() != num_steps {
                    return Err(ConfigError::SeriesLengthMismatch {
                        side,
                        expected: num_steps,
                        actual: series.len(),
                    });
                }
                series.clone()
            }
        };
        if let Some(step) = values.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteBoundaryValue {
                side,
                step: step + 1,
            });
        }
        Ok(Self {
            side,
            kind: config.kind,
            values,
        })
    }

    /// Prescribed value for the 1-based timestep `step`.
    pub fn prescribed(&self, step: usize) -> f64 {
        self.values[step - 1]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Ghost value that places the boundary node exactly at `value`.
#[inline]
pub fn fixed_value_ghost<T: DualNum<f64>>(value: T, neighbor: T) -> T {
    T::from(2.0) * value - neighbor
}

/// Ghost value from a central-difference flux balance at the boundary face.
#[inline]
pub fn fixed_gradient_ghost<T: DualNum<f64>>(flux: T, conductivity: f64, dx: f64, neighbor: T) -> T {
    neighbor + flux * T::from(2.0 * dx / conductivity)
}
