//! Tracing subscriber setup. Diagnostics go to stderr so command output on
//! stdout stays clean.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

pub fn init(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|err| anyhow!("invalid log filter '{filter}': {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
