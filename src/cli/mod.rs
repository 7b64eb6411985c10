//! CLI module for Scholar
//!
//! Provides command-line interface parsing and handling for the scholar binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scholar - research assistant agents over a hosted LLM
///
/// Summarize papers and videos, stage a debate over a paper, extract
/// knowledge graphs, and digest recent research feeds.
#[derive(Parser, Debug)]
#[command(
    name = "scholar",
    version,
    about = "Scholar - research assistant agents over a hosted LLM",
    long_about = "Summarize papers and videos, stage a debate over a paper, extract\n\
                  knowledge graphs, and digest recent research feeds.\n\n\
                  Every workflow is available as a subcommand and through the HTTP API ('serve').",
    after_help = "EXAMPLES:\n    \
                  scholar summarize paper.pdf                    # RAG summary of a local PDF\n    \
                  scholar summarize https://arxiv.org/pdf/1706.03762.pdf\n    \
                  scholar transcript https://youtu.be/dQw4w9WgXcQ # Summarize a video\n    \
                  scholar debate paper.pdf                       # Two agents argue over a paper\n    \
                  scholar graph paper.pdf -k attention           # Knowledge graph as HTML\n    \
                  scholar digest --catchy                        # Recent arXiv papers\n    \
                  scholar serve                                  # Start the HTTP API"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "scholar.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Summarize a PDF file or PDF URL with retrieval-augmented generation
    Summarize {
        /// Path to a local PDF, or an http(s) URL ending in .pdf
        source: String,
    },

    /// Summarize a YouTube video transcript for a research audience
    Transcript {
        /// Video URL or 11-character video id
        video: Option<String>,

        /// Read the transcript from a file (.json snippets or plain text) instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Preferred caption language (repeatable, in order of preference)
        #[arg(short, long = "lang")]
        languages: Vec<String>,
    },

    /// Stage a debate between a critical and a supporting agent over a paper
    Debate {
        /// Path to the paper PDF
        pdf: PathBuf,

        /// Points each side makes (overrides config)
        #[arg(short, long)]
        points: Option<usize>,

        /// Skip the final verdict
        #[arg(long)]
        no_judge: bool,
    },

    /// Extract a knowledge graph from a paper and render it as HTML
    Graph {
        /// Path to the paper PDF
        pdf: PathBuf,

        /// Output HTML file (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only summarize chunks mentioning one of these (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },

    /// List recent papers from research feeds
    Digest {
        /// Search query (overrides config)
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum results per source
        #[arg(short = 'n', long)]
        max_results: Option<usize>,

        /// Only papers published within this many hours
        #[arg(long)]
        hours_back: Option<i64>,

        /// Feed source: arxiv, semantic_scholar, pubmed (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Also rewrite titles into catchy headlines
        #[arg(long)]
        catchy: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
