//! CLI module for the Demografi command-line interface.
//!
//! Commands run either locally against the configured dataset or remotely
//! against a running server's HTTP API.

mod commands;
mod local;
mod output;
mod remote;
pub mod types;

pub use commands::*;
