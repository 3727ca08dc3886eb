use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::Mutex,
};

use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::Result;

const HEADER_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

fn open_append(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Marks the start of a run in the log file.
pub fn write_run_header(path: &Path) -> Result<()> {
    let mut file = open_append(path)?;
    writeln!(file, "\n{}", Local::now().format(HEADER_FORMAT))?;
    Ok(())
}

/// Everything goes to the run log; headless runs also log to stderr, since
/// there is no dashboard to draw over.
pub fn init(log_file: &Path, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(open_append(log_file)?));
    let stderr_layer = headless.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}
