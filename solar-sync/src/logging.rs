use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "solar_sync=info,solar_console=info";

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` lowers both crates to debug.
/// Calling it twice is harmless (the second install is ignored).
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("solar_sync=debug,solar_console=debug")
        } else {
            EnvFilter::new(DEFAULT_DIRECTIVES)
        }
    });

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
