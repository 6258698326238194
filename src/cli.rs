//! CLI argument parsing for the lead-route-worker binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lead-route-worker", about = "Lead search and route planning worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Search leads and print planned routes as JSON
    Plan {
        #[arg(long)]
        city: String,
        #[arg(long)]
        area: String,
        #[arg(long)]
        category: String,
        /// Plan every batch instead of only the first
        #[arg(long)]
        all: bool,
    },
    /// Print the route payload carried by a share link
    Decode {
        link: String,
    },
}
