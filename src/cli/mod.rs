//! CLI module for Funnelcraft
//!
//! Provides commands:
//! - `init`: Create the element store schema
//! - `show`: Print stored steps or one step's elements
//! - `apply`: Run a script of edit commands against a step

use clap::{Parser, Subcommand};
use funnelcraft_canvas::SqliteElementStore;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use tracing::debug;

pub mod apply;
pub mod init;
pub mod show;

/// Funnelcraft canvas CLI
#[derive(Parser, Debug)]
#[command(name = "funnelcraft")]
#[command(about = "Funnel page builder canvas engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the element store schema
    Init,
    /// Print stored steps, or the elements of one step
    Show {
        /// Step to print
        #[arg(long)]
        step: Option<String>,
    },
    /// Apply a JSON script of edit commands to a step
    Apply {
        /// Step to edit
        #[arg(long)]
        step: String,
        /// Path to a JSON array of edit commands
        #[arg(long)]
        script: PathBuf,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Init) => init::run().await,
        Some(Commands::Show { step }) => show::run(step).await,
        Some(Commands::Apply { step, script }) => apply::run(step, script).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Connect to the configured database and make sure the schema exists
pub(crate) async fn open_store(database_url: &str) -> anyhow::Result<SqliteElementStore> {
    debug!(database_url, "Opening element store");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    let store = SqliteElementStore::new(pool);
    store.init().await?;
    Ok(store)
}
