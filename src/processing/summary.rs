use crate::config::SimulationConfig;
use crate::numerics::transient::SimulationResult;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct SimulationSummary {
    // Grid
    pub num_nodes: usize,
    pub length: f64,
    pub dx: f64,

    // Material
    pub material: String,
    pub conductivity: f64,
    pub diffusivity: f64,

    // Time marching
    pub num_steps: usize,
    pub delta_time: f64,
    pub end_time: f64,
    pub emissivity: Option<f64>,

    // Solver
    pub total_iterations: u64,
    pub max_iterations: u32,
    pub worst_residual: f64,
    pub unconverged_steps: usize,

    // Temperatures (K)
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub final_surface_x0: f64,
    pub final_surface_xl: f64,
}

impl SimulationSummary {
    pub fn from_run(config: &SimulationConfig, result: &SimulationResult) -> Self {
        let num_nodes = config.number_of_nodes;
        let dx = config.length / (num_nodes - 1) as f64;
        let (min_temperature, max_temperature) = result.profile.min_max();
        let final_t = result.profile.final_temperature();

        Self {
            num_nodes,
            length: config.length,
            dx,
            material: config.material.name.clone(),
            conductivity: config.material.conductivity,
            diffusivity: config.material.diffusivity(),
            num_steps: result.log.len(),
            delta_time: config.solver.delta_time,
            end_time: result.log.records().last().map_or(0.0, |r| r.time),
            emissivity: config.radiation.as_ref().map(|r| r.emissivity),
            total_iterations: result.log.total_iterations(),
            max_iterations: result.log.max_iterations(),
            worst_residual: result.log.worst_residual(),
            unconverged_steps: result.log.unconverged_steps(),
            min_temperature,
            max_temperature,
            final_surface_x0: final_t[0],
            final_surface_xl: final_t[final_t.len() - 1],
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write_report(&mut file)
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "HEAT CONDUCTION SIMULATION SUMMARY")?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out)?;

        writeln!(out, "GRID")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Number of nodes:     {}", self.num_nodes)?;
        writeln!(out, "Domain length:       {:.6e} m", self.length)?;
        writeln!(out, "Node spacing:        {:.6e} m", self.dx)?;
        writeln!(out)?;

        writeln!(out, "MATERIAL")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Name:                {}", self.material)?;
        writeln!(out, "Conductivity:        {:.4} W/(m·K)", self.conductivity)?;
        writeln!(out, "Diffusivity:         {:.6e} m²/s", self.diffusivity)?;
        writeln!(out)?;

        writeln!(out, "TIME MARCHING")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Timesteps:           {}", self.num_steps)?;
        writeln!(out, "Step size:           {:.6e} s", self.delta_time)?;
        writeln!(out, "End time:            {:.6e} s", self.end_time)?;
        match self.emissivity {
            Some(e) => writeln!(out, "Radiation at x=0:    emissivity {:.3}", e)?,
            None => writeln!(out, "Radiation at x=0:    off")?,
        }
        writeln!(out)?;

        writeln!(out, "SOLVER PERFORMANCE")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Total iterations:    {}", self.total_iterations)?;
        writeln!(out, "Max per step:        {}", self.max_iterations)?;
        writeln!(out, "Worst residual:      {:.6e}", self.worst_residual)?;
        writeln!(out, "Unconverged steps:   {}", self.unconverged_steps)?;
        writeln!(out)?;

        writeln!(out, "TEMPERATURES")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Minimum:             {:.4} K", self.min_temperature)?;
        writeln!(out, "Maximum:             {:.4} K", self.max_temperature)?;
        writeln!(out, "Final at x=0:        {:.4} K", self.final_surface_x0)?;
        writeln!(out, "Final at x=L:        {:.4} K", self.final_surface_xl)?;
        writeln!(out)?;

        writeln!(out, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SIMULATION SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Grid:          {} nodes over {:.3e} m ({})",
            self.num_nodes, self.length, self.material
        );
        println!(
            "Steps:         {} x {:.3e} s (t_end = {:.3} s)",
            self.num_steps, self.delta_time, self.end_time
        );
        println!(
            "Iterations:    total={}, max={}, unconverged steps={}",
            self.total_iterations, self.max_iterations, self.unconverged_steps
        );
        println!("Worst res:     {:.3e}", self.worst_residual);
        println!(
            "Surface:       x=0 {:.2} K, x=L {:.2} K",
            self.final_surface_x0, self.final_surface_xl
        );
        println!("{}\n", "=".repeat(60));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slab::slab_problem_def;

    #[test]
    fn summary_reflects_run() {
        let mut cfg = slab_problem_def(51, 5, None);
        cfg.show_progress = false;
        let result = crate::solve(&cfg).unwrap();
        let summary = SimulationSummary::from_run(&cfg, &result);

        assert_eq!(summary.num_nodes, 51);
        assert_eq!(summary.num_steps, 5);
        assert!((summary.end_time - 1.0).abs() < 1e-12);
        assert!((summary.dx - 1e-3).abs() < 1e-15);
        assert_eq!(summary.unconverged_steps, 0);
        assert!((summary.min_temperature - 298.0).abs() < 1e-9);
        assert!(summary.final_surface_x0 > summary.final_surface_xl);
        assert!(summary.max_temperature >= summary.final_surface_x0);

        let mut report = Vec::new();
        summary.write_report(&mut report).unwrap();
        let text = String::from_utf8(report).unwrap();
        assert!(text.contains("Unconverged steps:   0"));
        assert!(text.contains("Radiation at x=0:    off"));
    }
}
