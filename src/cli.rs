//! Command-line interface for driftdoc

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "driftdoc")]
#[command(about = "Documents configuration drift between a pilot and a production environment")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Report config file (defaults to ./driftdoc.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Logger filter: Debug with `--verbose`, Info otherwise
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render an HTML drift report
    Report {
        /// Section files or directories of section files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// HTML file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Override the report title from the config
        #[arg(long)]
        title: Option<String>,
    },

    /// Print per-section change counts
    Summary {
        /// Section files or directories of section files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Write a default report config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
