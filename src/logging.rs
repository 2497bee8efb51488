use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Does nothing if a global subscriber is already set.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "dbhelper=debug,info"
    } else {
        "dbhelper=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init();
}
