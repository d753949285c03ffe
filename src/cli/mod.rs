use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;

pub mod commands;

#[derive(Parser)]
#[command(name = "corpus-query-state")]
#[command(version = "0.1.0")]
#[command(about = "Decode and encode corpus search urls", long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a search url and print the decoded state as JSON
    Decode {
        /// Corpus schema (JSON)
        #[arg(long)]
        schema: PathBuf,
        url: String,
    },
    /// Encode a history entry into a url relative to the current one
    Encode {
        #[arg(long)]
        schema: PathBuf,
        /// History entry (JSON), e.g. the `entry` printed by `decode`
        #[arg(long)]
        state: PathBuf,
        /// Url currently shown
        #[arg(long)]
        url: String,
        /// Also add the query to the search history
        #[arg(long)]
        record: bool,
        /// History store directory, defaults to the platform data directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// List the search history of a corpus
    History {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Some(Commands::Decode { schema, url }) => {
            commands::decode(&config, schema, url)?;
        }
        Some(Commands::Encode { schema, state, url, record, store }) => {
            commands::encode(&config, schema, state, url, *record, store.as_deref())?;
        }
        Some(Commands::History { schema, store }) => {
            commands::history(&config, schema, store.as_deref())?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
