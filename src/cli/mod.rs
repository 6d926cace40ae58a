//! CLI module for tamperlog
//!
//! Provides command-line interface for:
//! - serve: Boot the service and run the HTTP server
//! - append: One-shot append to the durable log
//! - verify: One-shot verification of the durable log
//! - latest: One-shot read of the newest record
//! - keygen: Print a random secret key

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    append, build_service, keygen, latest, run, run_command, serve, verify, Config,
    DEFAULT_KEY_ENV,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
