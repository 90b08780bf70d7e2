use tracing_subscriber::EnvFilter;

/// Initialise logging for hosts and test tools. Defaults to `info`; passing
/// `debug = true` raises the level to `debug` and lets `RUST_LOG` override
/// the filter. Safe to call more than once; later calls are no-ops.
pub fn init(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        // Pin the level so a stray RUST_LOG in the environment cannot flood
        // hover/render tracing onto interactive output.
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
