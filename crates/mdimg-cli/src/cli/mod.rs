//! CLI for mdimg.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdimg_core::config;
use std::path::PathBuf;

use commands::{run_directory_command, run_rewrite, run_scan};

/// Top-level CLI for mdimg.
#[derive(Debug, Parser)]
#[command(name = "mdimg")]
#[command(about = "mdimg: download images referenced by markdown documents and link them locally", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Localize images in every markdown document of a directory (no recursion).
    Run {
        /// Directory to process (default: current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Cache directory name, relative to the processed directory (overrides config).
        #[arg(long, value_name = "NAME")]
        cache_dir: Option<String>,
    },

    /// Localize images in a single document.
    Rewrite {
        /// Path to the document.
        path: PathBuf,
        /// Cache directory name, relative to the document's directory (overrides config).
        #[arg(long, value_name = "NAME")]
        cache_dir: Option<String>,
    },

    /// List image references in a document and whether each is cached. Fetches nothing.
    Scan {
        /// Path to the document.
        path: PathBuf,
        /// Cache directory name, relative to the document's directory (overrides config).
        #[arg(long, value_name = "NAME")]
        cache_dir: Option<String>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { dir, cache_dir } => {
                let dir = match dir {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                run_directory_command(&cfg, &dir, cache_dir.as_deref())?;
            }
            CliCommand::Rewrite { path, cache_dir } => {
                run_rewrite(&cfg, &path, cache_dir.as_deref())?;
            }
            CliCommand::Scan { path, cache_dir } => {
                run_scan(&cfg, &path, cache_dir.as_deref())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
