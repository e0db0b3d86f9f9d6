//! Tracing subscriber setup for the CLI binary.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "memepress=info";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init so embedding tests can install their own subscriber first.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
