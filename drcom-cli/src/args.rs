//! CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "drcom")]
#[command(version, about = "Drcom campus network authentication client", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./drcom.toml, ~/.config/drcom/drcom.toml, /etc/drcom/drcom.toml)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Log in and keep the session alive until interrupted (default)
    Start,

    /// Print a configuration template
    GenerateConfig,

    /// Derive the gateway constants from a capture of the official client
    Analyse {
        /// Capture file (pcap or pcapng)
        #[arg(value_name = "CAPTURE")]
        capture: PathBuf,
    },

    /// List network interfaces with their IPv4 and MAC addresses
    Interfaces,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand to run, `start` when none was given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}
