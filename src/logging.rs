use std::{env, fs::File, path::PathBuf};

use color_eyre::{Result, eyre::Context};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Environment variable overriding the log filter, enabling logs even if disabled on the config
const LOG_ENV: &str = "CMDPAL_LOG";

/// Resolves the log file path and the filter to apply, which is `None` when logging is disabled
pub fn resolve_path_and_filter(config: &Config) -> (PathBuf, Option<String>) {
    resolve_with_env(config, env::var(LOG_ENV).ok())
}

fn resolve_with_env(config: &Config, env_filter: Option<String>) -> (PathBuf, Option<String>) {
    let path = config.data_dir.join("cmdpal.log");
    let filter = match env_filter {
        Some(filter) => Some(filter),
        None if config.logs.enabled => Some(config.logs.filter.clone()),
        None => None,
    };
    (path, filter)
}

/// Initializes the tracing subscriber, writing logs to the given file if there's a filter
pub fn init(path: PathBuf, filter: Option<String>) -> Result<()> {
    let Some(filter) = filter else {
        return Ok(());
    };
    let log_file =
        File::create(&path).wrap_err_with(|| format!("Couldn't create the log file: {}", path.display()))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .parse(filter)
        .wrap_err("Couldn't parse the log filter")?;
    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);
    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
