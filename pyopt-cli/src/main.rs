//! pyopt CLI - rule-based program tree optimizer

#![warn(missing_docs)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use config::OutputFormat;

#[derive(Parser)]
#[command(name = "pyopt")]
#[command(about = "Explainable rule-based optimizer for Python program trees", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize one or more program trees
    Optimize {
        /// JSON program trees to optimize
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Optimization level (0=none, 1=basic, 2=standard, 3=aggressive)
        #[arg(short = 'O', long = "opt", value_parser = clap::value_parser!(u8).range(0..=3))]
        optimization: Option<u8>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Print optimization statistics
        #[arg(long)]
        stats: bool,
    },

    /// List the rewrite rules
    Rules,
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.debug);

    // Load configuration
    let config = config::load_config(cli.config)?;

    match cli.command {
        Commands::Optimize {
            files,
            optimization,
            format,
            stats,
        } => {
            let settings = config.optimizer.resolve(optimization);
            let mut output = config.output;
            if let Some(format) = format {
                output.format = format;
            }
            output.show_stats |= stats;

            commands::optimize::optimize_files(&files, &settings, &output)
        }
        Commands::Rules => {
            commands::rules::list_rules(&config.optimizer.resolve(None));
            Ok(())
        }
    }
}
