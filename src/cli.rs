use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ats-job-service", version, about = "Jobs CRUD function for the ATS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Serve the invocation endpoint (default)
    Serve,

    /// Handle a single event read from a file and print the response
    Invoke {
        /// Path to an HTTP API (payload v2) event in JSON
        #[arg(short, long)]
        event: PathBuf,
    },
}
