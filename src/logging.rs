use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the host process or a test run.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this more than
/// once is harmless.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();
}
