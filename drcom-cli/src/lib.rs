//! Command-line front end of the Drcom client
//!
//! Argument parsing, TOML configuration, logging setup and the PID file.
//! The `drcom` binary wires these to `drcom-client`.

pub mod args;
pub mod config;
pub mod logging;
pub mod pidfile;

pub use args::{Cli, Commands};
pub use config::Config;
pub use pidfile::PidFile;
