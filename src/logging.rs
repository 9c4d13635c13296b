use chrono::Local;
use log::LevelFilter;
use std::io::Write;

/// Install the `env_logger` backend. The level comes from `level`, then
/// `RUST_LOG`, then defaults to info. Calling it twice is harmless.
pub fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info);

    let installed = env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .is_ok();

    if installed {
        log::info!("Logger initialized (level: {})", log_level);
    }
}
