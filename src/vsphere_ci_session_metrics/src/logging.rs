use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn level_filter(level: &str) -> Result<EnvFilter> {
    let level: Level = level
        .parse()
        .with_context(|| format!("not a valid log level: {level:?}"))?;
    Ok(EnvFilter::default().add_directive(LevelFilter::from_level(level).into()))
}

pub fn setup_logging(level: &str) -> Result<()> {
    let filter = level_filter(level)?;

    let stdout_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_level(true);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    tracing::debug!("Logging system initialized at level {}", level);
    Ok(())
}
