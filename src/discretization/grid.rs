use crate::config::ConfigError;

/// Uniform 1-D node layout on `[0, length]`, boundary nodes included.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub length: f64,
    pub num_nodes: usize,
    pub dx: f64,
}

impl Grid {
    pub fn new(length: f64, num_nodes: usize) -> Result<Self, ConfigError> {
        if num_nodes < 3 {
            return Err(ConfigError::TooFewNodes(num_nodes));
        }
        if length <= 0.0 || !length.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "length",
                value: length,
            });
        }
        let dx = length / (num_nodes as f64 - 1.0);
        if dx <= 0.0 || !dx.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "grid spacing",
                value: dx,
            });
        }
        Ok(Self {
            length,
            num_nodes,
            dx,
        })
    }

    pub fn position(&self, i: usize) -> f64 {
        i as f64 * self.dx
    }

    pub fn positions(&self) -> Vec<f64> {
        (0..self.num_nodes).map(|i| self.position(i)).collect()
    }
}
