use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Diagnostics go to stderr; progress lines stay on stdout via `println!`.
/// `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "launcher_icon=debug" } else { "launcher_icon=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init();
}
