use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Send tracing output to `log_file`; the terminal belongs to the UI.
///
/// `RUST_LOG` controls filtering and defaults to `info`.
pub fn init(log_file: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()?;

    Ok(())
}
