use crate::config::SimulationConfig;
use crate::numerics::SolverConfig;
use crate::physics::MaterialProperties;
use crate::physics::bc::{BoundaryConfig, Radiation};

/// Carbon steel at room temperature.
pub fn steel() -> MaterialProperties {
    // k in W/(m·K), rho in kg/m³, cp in J/(kg·K)
    MaterialProperties::new("steel", 60.5, 7850.0, 434.0)
}

/// A 5 cm steel slab at 298 K, heated with 750 kW/m² at x=0 and insulated at
/// x=L, stepped at 0.2 s.
///
/// The tolerance is 1e-6: on a 501-node grid the residual of an exact solve
/// bottoms out near 3e-10 from rounding alone, so anything much tighter can
/// never be met.
pub fn slab_problem_def(num_nodes: usize, num_steps: usize, emissivity: Option<f64>) -> SimulationConfig {
    SimulationConfig {
        length: 0.05,
        number_of_nodes: num_nodes,
        material: steel(),
        initial_temperature: 298.0,
        boundary_x0: BoundaryConfig::heat_flux(750000.0),
        boundary_xl: BoundaryConfig::heat_flux(0.0),
        radiation: emissivity.map(|emissivity| Radiation { emissivity }),
        solver: SolverConfig::new(0.2, num_steps)
            .with_max_iteration(20)
            .with_tolerance(1e-6)
            .with_relaxation(1.0),
        show_progress: true,
    }
}

/// The default run: 501 nodes, 50 steps, no radiation.
pub fn steel_slab() -> SimulationConfig {
    slab_problem_def(501, 50, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_is_valid() {
        let cfg = steel_slab();
        cfg.validate().unwrap();
        assert!((cfg.material.diffusivity() - 1.7758e-5).abs() < 1e-8);
        assert!(slab_problem_def(51, 10, Some(0.8)).validate().is_ok());
    }
}
