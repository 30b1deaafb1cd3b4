//! Tracing subscriber setup

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count, `None` keeps the configured level
pub fn verbosity_directive(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Build the filter: `RUST_LOG` wins, then `-v`, then the configured level
pub fn build_filter(verbose: u8, configured: &str) -> EnvFilter {
    let directive = verbosity_directive(verbose).unwrap_or(configured);
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// With `log_file` the output is appended to that file without colours,
/// otherwise it goes to stderr.
pub fn init(verbose: u8, configured: &str, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = build_filter(verbose, configured);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}
