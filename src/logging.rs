use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::paths;
use crate::Result;

/// Installs the process-wide subscriber: one layer to stderr and one
/// ANSI-free layer to `<run_dir>/<run_name>.log`. Called exactly once by
/// the orchestrator, after the run directory exists; nothing else
/// reconfigures logging.
pub fn init(run_dir: &Path, run_name: &str) -> Result<()> {
    let log_file = File::create(paths::out_log(run_dir, run_name))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    Ok(())
}
