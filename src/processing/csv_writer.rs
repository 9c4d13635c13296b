use crate::numerics::history::{StepLog, TemperatureProfile};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write column-major data with a header row. Shorter columns leave blank cells.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[String], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);

    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| col.get(i).map_or_else(String::new, |v| format!("{:.15e}", v)))
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    file.flush()
}

/// Node positions followed by one temperature column per stored time.
pub fn write_profile<P: AsRef<Path>>(path: P, profile: &TemperatureProfile) -> io::Result<()> {
    let mut headers = vec!["x_m".to_string()];
    let mut data = vec![profile.positions().to_vec()];
    for (column, time) in profile.times().into_iter().enumerate() {
        headers.push(format!("t={:.4}s", time));
        data.push(profile.column(column).iter().copied().collect());
    }
    write_csv(path, &headers, &data)
}

/// Temperature traces at the nodes nearest to `positions`.
pub fn write_thermocouples<P: AsRef<Path>>(
    path: P,
    profile: &TemperatureProfile,
    positions: &[f64],
) -> io::Result<()> {
    let mut headers = vec!["time_s".to_string()];
    let mut data = vec![profile.times()];
    for &x in positions {
        let node = profile.nearest_node(x);
        headers.push(format!("x={:.4}m", profile.positions()[node]));
        data.push(profile.node_history(node));
    }
    write_csv(path, &headers, &data)
}

/// Spatial profiles at the stored times nearest to `times`.
pub fn write_distributions<P: AsRef<Path>>(
    path: P,
    profile: &TemperatureProfile,
    times: &[f64],
) -> io::Result<()> {
    let stored = profile.times();
    let mut headers = vec!["x_m".to_string()];
    let mut data = vec![profile.positions().to_vec()];
    for &t in times {
        let column = profile.nearest_column(t);
        headers.push(format!("t={:.4}s", stored[column]));
        data.push(profile.column(column).iter().copied().collect());
    }
    write_csv(path, &headers, &data)
}

pub fn write_step_log<P: AsRef<Path>>(path: P, log: &StepLog) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "step,time_s,iterations,residual,converged")?;
    for record in log.iter() {
        writeln!(
            file,
            "{},{:.6e},{},{:.6e},{}",
            record.step, record.time, record.iterations, record.residual, record.converged
        )?;
    }
    file.flush()
}
