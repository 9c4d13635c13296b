use heatcond_rs::config::SimulationConfig;
use heatcond_rs::logging::init_logging;
use heatcond_rs::models::slab::steel_slab;
use heatcond_rs::numerics::transient::{SimulationResult, TransientSolver};
use heatcond_rs::processing::csv_writer;
use heatcond_rs::processing::summary::SimulationSummary;
use log::{error, info};
use std::fs;
use std::process;

const OUTPUT_DIR: &str = "output/main";

/// Thermocouple depths in m.
const THERMOCOUPLES: [f64; 6] = [0.0, 0.002, 0.004, 0.006, 0.008, 0.010];
/// Snapshot times in s.
const SNAPSHOTS: [f64; 6] = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];

fn main() {
    init_logging(None);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            SimulationConfig::from_json_file(&path).unwrap_or_else(|e| {
                error!("{e}");
                process::exit(1);
            })
        }
        None => steel_slab(),
    };

    let solver = TransientSolver::new(config.clone()).unwrap_or_else(|e| {
        error!("invalid configuration: {e}");
        process::exit(1);
    });

    let result = solver.run().unwrap_or_else(|e| {
        error!("simulation failed: {e}");
        process::exit(1);
    });

    fs::create_dir_all(OUTPUT_DIR).expect("Failed to create output directory");
    save_results(&result);

    let summary = SimulationSummary::from_run(&config, &result);
    summary
        .write_to_file(format!("{OUTPUT_DIR}/simulation_summary.txt"))
        .expect("Failed to write summary");
    summary.print_to_console();

    println!("Summary saved to {OUTPUT_DIR}/simulation_summary.txt");
}

fn save_results(result: &SimulationResult) {
    csv_writer::write_profile(format!("{OUTPUT_DIR}/profile.csv"), &result.profile)
        .expect("Failed to write temperature profile");
    csv_writer::write_step_log(format!("{OUTPUT_DIR}/step_log.csv"), &result.log)
        .expect("Failed to write step log");
    csv_writer::write_thermocouples(
        format!("{OUTPUT_DIR}/thermocouples.csv"),
        &result.profile,
        &THERMOCOUPLES,
    )
    .expect("Failed to write thermocouple traces");
    csv_writer::write_distributions(
        format!("{OUTPUT_DIR}/distributions.csv"),
        &result.profile,
        &SNAPSHOTS,
    )
    .expect("Failed to write temperature distributions");

    info!("Results saved to {OUTPUT_DIR}/");
}
