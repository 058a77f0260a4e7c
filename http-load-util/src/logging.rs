use log::info;
use simplelog::{CombinedLogger, Config, LevelFilter, SimpleLogger};

/// Maps repeated `-v` / `-q` flags to a level. Verbosity wins over quiet.
#[must_use]
pub fn level_filter(verbose: u8, quiet: u8) -> LevelFilter {
    match verbose {
        0 => match quiet {
            0 => LevelFilter::Info,
            _ => LevelFilter::Warn,
        },
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_logger(verbose: u8, quiet: u8) {
    let level = level_filter(verbose, quiet);
    if let Err(e) = CombinedLogger::init(vec![SimpleLogger::new(level, Config::default())]) {
        eprintln!("failed to initialize CombinedLogger: {e}");
        return;
    }
    info!("Output verbosity level: {}", level);
}
