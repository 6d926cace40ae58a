//! CLI argument definitions using clap
//!
//! Commands:
//! - tamperlog serve [--config <path>] [--port <port>]
//! - tamperlog append [--config <path>] <DATA>
//! - tamperlog verify [--config <path>]
//! - tamperlog latest [--config <path>]
//! - tamperlog keygen

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tamperlog - A tamper-evident, HMAC-verified append-only record log
#[derive(Parser, Debug)]
#[command(name = "tamperlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Append one record to the durable log and exit
    Append {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Payload to append
        data: String,
    },

    /// Verify the durable log and print the latest verified record
    Verify {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the newest record of the durable log without verifying it
    Latest {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print a fresh random hex-encoded secret key
    Keygen,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["tamperlog", "serve", "--port", "9000"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Serve {
                config: None,
                port: Some(9000)
            }
        );
    }

    #[test]
    fn test_parse_append() {
        let cli =
            Cli::try_parse_from(["tamperlog", "append", "--config", "c.json", "Hello World!"])
                .unwrap();
        assert_eq!(
            cli.command,
            Command::Append {
                config: Some(PathBuf::from("c.json")),
                data: "Hello World!".to_string()
            }
        );
    }

    #[test]
    fn test_append_requires_data() {
        assert!(Cli::try_parse_from(["tamperlog", "append"]).is_err());
    }
}
