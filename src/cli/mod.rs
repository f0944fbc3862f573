//! CLI module for Kindred.
//!
//! Subcommands:
//! - `init`: Initialize the database schema
//! - `seed`: Load a small demo dataset
//! - `duplicates`: Rank candidate duplicate pairs
//! - `merge`: Merge a duplicate entity into a primary entity

mod duplicates;
mod init;
mod merge;
mod seed;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::context::Context;
use crate::db::Db;

/// Kindred - Entity Registry Deduplication
#[derive(Parser)]
#[command(name = "kindred")]
#[command(about = "Entity registry - duplicate detection and merging")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize the database schema
    Init,

    /// Load a small demo dataset for local experimentation
    Seed,

    /// Rank candidate duplicate pairs
    Duplicates {
        /// Minimum composite score, between 0 and 1 (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Restrict to pairs containing this entity
        #[arg(long)]
        entity: Option<String>,

        /// Page size
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Offset into the ranked result
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Merge a duplicate entity into a primary entity
    Merge {
        /// Entity that survives the merge
        #[arg(long)]
        primary: String,

        /// Entity that is deleted by the merge
        #[arg(long)]
        duplicate: String,

        /// Field override applied to the primary, as field=value
        /// (value parsed as JSON, falling back to a plain string)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// Category to additionally link to the primary (repeatable)
        #[arg(long = "category", value_name = "CATEGORY_ID")]
        categories: Vec<String>,

        /// Operator note recorded in the merge log
        #[arg(long)]
        note: Option<String>,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Init => self.run_init().await,
            Command::Seed => self.run_seed().await,
            Command::Duplicates {
                threshold,
                ref entity,
                limit,
                offset,
            } => {
                self.run_duplicates(threshold, entity.as_deref(), limit, offset)
                    .await
            }
            Command::Merge {
                ref primary,
                ref duplicate,
                ref set,
                ref categories,
                ref note,
            } => {
                self.run_merge(primary, duplicate, set, categories, note.as_deref())
                    .await
            }
        }
    }

    /// Load config and connect, producing the DI root.
    async fn context(&self) -> color_eyre::Result<Context> {
        let config = Config::load()?;
        tracing::debug!("connecting to PostgreSQL");
        let db = Db::connect(&config.postgres.uri).await?;
        Ok(Context::new(db, config))
    }
}
