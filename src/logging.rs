use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Structured logging to stderr. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "info,tjnj=debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}
