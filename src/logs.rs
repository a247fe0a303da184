use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

pub fn rotating_log_file(log_dir: &str) -> FileRotate<AppendTimestamp> {
    let path = Path::new(log_dir).join("busmap.log");
    FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(3)),
        ContentLimit::Lines(1000),
        Compression::None,
        #[cfg(unix)]
        None,
    )
}

/// Logs to the terminal, and to a rolling file under `log_dir` when given.
pub fn init(log_dir: Option<&str>) -> Result<()> {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(log_dir) = log_dir {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log dir {log_dir}"))?;
        loggers.push(WriteLogger::new(
            LevelFilter::Info,
            config,
            rotating_log_file(log_dir),
        ));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}
