//! Logging setup for the CLI.
//!
//! Logs go to stderr so stdout carries only the generated document.

use tracing_subscriber::EnvFilter;

/// Directive forced by `-v` / `-q`, if any.
pub fn level_override(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some("debug")
    } else if quiet {
        Some("error")
    } else {
        None
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` applies unless `-v` or `-q` was given; the default level is `warn`.
pub fn init(verbose: bool, quiet: bool) {
    let filter = match level_override(verbose, quiet) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
