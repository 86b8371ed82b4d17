//! CLI module for Notat.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Notat - Lecture Notes from Recorded Audio
///
/// Turns recorded lectures into structured study notes: transcription,
/// topic segmentation, summarization, and multi-format export.
/// The name "Notat" comes from the Norwegian/Scandinavian word for "note."
#[derive(Parser, Debug)]
#[command(name = "notat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a lecture recording into structured notes
    Process {
        /// Local audio/video file path
        input: String,

        /// Also export the notes (markdown, pdf, docx, or all)
        #[arg(short, long)]
        export: Option<String>,

        /// Title for exported documents
        #[arg(short, long)]
        title: Option<String>,

        /// Print the full pipeline report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
