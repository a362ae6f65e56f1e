//! CLI module for Consulta.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Consulta - Transcript Question Answering
///
/// A local-first CLI tool for asking questions over an archive of subtitle
/// (.srt) transcripts, with hybrid semantic + keyword retrieval.
#[derive(Parser, Debug)]
#[command(name = "consulta")]
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
    /// Ingest .srt transcripts: chunk, embed and index them
    Ingest {
        /// Corpus directory (defaults to the configured corpus_dir)
        #[arg(short, long)]
        dir: Option<String>,

        /// Re-ingest sources that are already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a question and get a cited answer from the transcript archive
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Retrieve relevant transcript chunks without calling the LLM
    Search {
        /// Search query
        query: String,

        /// Maximum number of results to display
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Literal scan of the raw .srt files for an exact term
    Scan {
        /// Term to look for (case-insensitive)
        term: String,

        /// Corpus directory (defaults to the configured corpus_dir)
        #[arg(short, long)]
        dir: Option<String>,

        /// Maximum number of matches to display
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List indexed sources
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Write a default configuration file
    Init,
    /// Print the configuration file path
    Path,
}
