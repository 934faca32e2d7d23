//! CLI commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Switchyard - Warp multi-agent protocol tooling
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (base URL, schema directory, client identity)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List schema types, or describe one
    Schema {
        /// Schema directory (defaults to the configured or bundled one)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Type name, bare (`Request`) or fully qualified
        name: Option<String>,
    },

    /// Translate an Anthropic Messages request and print the wire request
    Encode {
        /// Path to the request JSON
        request: PathBuf,

        /// Working directory reported to the upstream
        #[arg(long, default_value = "/tmp")]
        working_dir: String,

        /// Print the wire request as JSON instead of base64 bytes
        #[arg(long)]
        json: bool,
    },

    /// Replay a captured `data: <base64>` stream as Anthropic SSE frames
    Decode {
        /// Path to the captured event stream
        capture: PathBuf,

        /// Model name reported in `message_start`
        #[arg(short, long, default_value = "claude-4-sonnet")]
        model: String,

        /// Print the buffered message instead of SSE frames
        #[arg(long)]
        buffered: bool,
    },
}
