use std::f64::consts::PI;

use heatcond_rs::config::SimulationConfig;
use heatcond_rs::models::slab::slab_problem_def;
use heatcond_rs::numerics::SolverConfig;
use heatcond_rs::physics::MaterialProperties;
use heatcond_rs::physics::bc::BoundaryConfig;
use heatcond_rs::solve;

/// Slab of unit length and unit diffusivity at 300 K whose faces are held at 400 K.
fn quenched_slab(num_nodes: usize, end_time: f64) -> SimulationConfig {
    let dx = 1.0 / (num_nodes - 1) as f64;
    let dt = 0.5 * dx * dx;
    let steps = (end_time / dt).round() as usize;
    SimulationConfig {
        length: 1.0,
        number_of_nodes: num_nodes,
        material: MaterialProperties::new("unit", 1.0, 1.0, 1.0),
        initial_temperature: 300.0,
        boundary_x0: BoundaryConfig::fixed_temperature(400.0),
        boundary_xl: BoundaryConfig::fixed_temperature(400.0),
        radiation: None,
        solver: SolverConfig::new(dt, steps).with_tolerance(1e-8),
        show_progress: false,
    }
}

fn quenched_slab_exact(x: f64, t: f64) -> f64 {
    let (t_i, t_b) = (300.0, 400.0);
    let series: f64 = (0..200)
        .map(|k| {
            let n = (2 * k + 1) as f64;
            4.0 / (n * PI) * (n * PI * x).sin() * (-n * n * PI * PI * t).exp()
        })
        .sum();
    t_b + (t_i - t_b) * series
}

fn max_error(num_nodes: usize) -> f64 {
    let cfg = quenched_slab(num_nodes, 0.1);
    let time = cfg.solver.time_at(cfg.solver.number_of_time_steps);
    let result = solve(&cfg).unwrap();
    let final_t = result.profile.final_temperature();
    result
        .profile
        .positions()
        .iter()
        .zip(final_t.iter())
        .map(|(&x, &t)| (t - quenched_slab_exact(x, time)).abs())
        .fold(0.0, f64::max)
}

#[test]
fn basic_verif() {
    println!("Test 1: Uniform state with adiabatic faces");
    let mut cfg = slab_problem_def(51, 10, None);
    cfg.boundary_x0 = BoundaryConfig::heat_flux(0.0);
    cfg.show_progress = false;
    let result = solve(&cfg).unwrap();
    assert!(result.profile.values().iter().all(|&t| t == 298.0));
    for record in result.log.iter() {
        assert_eq!(record.iterations, 0);
        assert_eq!(record.residual, 0.0);
        assert!(record.converged);
    }

    println!("Test 2: Linear problem converges in one correction");
    let mut cfg = slab_problem_def(101, 10, None);
    cfg.show_progress = false;
    let result = solve(&cfg).unwrap();
    assert!(result.log.iter().all(|r| r.iterations == 1 && r.converged));
    let surface = result.profile.at_position(0.0);
    assert!(surface.windows(2).all(|w| w[1] > w[0]));
    let energy_in = 750000.0 * 2.0;
    let dx = 0.05 / 100.0;
    let final_t = result.profile.final_temperature();
    // Trapezoidal rule matches the ghost-node boundary treatment.
    let stored: f64 = final_t
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let w = if i == 0 || i == 100 { 0.5 } else { 1.0 };
            w * dx * (t - 298.0)
        })
        .sum::<f64>()
        * 7850.0
        * 434.0;
    println!("  energy in {energy_in:.4e} J/m², stored {stored:.4e} J/m²");
    assert!((stored - energy_in).abs() / energy_in < 1e-6);
}

#[test]
fn grid_refinement_matches_analytic_solution() {
    let e21 = max_error(21);
    let e41 = max_error(41);
    let ratio = e21 / e41;
    println!("max error N=21: {e21:.4e}, N=41: {e41:.4e}, ratio {ratio:.3}");
    assert!(ratio > 3.5 && ratio < 4.5);
    assert!(e41 < 0.3);
}

#[test]
fn reruns_are_bitwise_identical() {
    let mut cfg = slab_problem_def(101, 15, Some(0.8));
    cfg.show_progress = false;
    let first = solve(&cfg).unwrap();
    let second = solve(&cfg).unwrap();
    assert_eq!(first, second);
}

#[test]
fn json_config_drives_a_run() {
    let mut cfg = slab_problem_def(41, 4, Some(0.5));
    cfg.show_progress = false;
    let text = cfg.to_json_string().unwrap();
    let loaded = SimulationConfig::from_json_str(&text).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(solve(&loaded).unwrap(), solve(&cfg).unwrap());
}
