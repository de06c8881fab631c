//! CLI module - Command-line interface for marketdesk
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// marketdesk - market dashboard backend
/// Session-authenticated portfolio and watchlist API
#[derive(Parser)]
#[command(name = "marketdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Apply database migrations and exit
    Migrate,

    /// Create the demo account from the [demo] config section
    SeedDemo,

    /// Delete expired session tracking tokens
    PruneSessions,
}

pub use commands::*;
