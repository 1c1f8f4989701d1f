// SPDX-FileCopyrightText: 2026 CreatorVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CreatorVault - an encrypted local vault for creator dashboard data.
//!
//! This is the binary entry point for the `creatorvault` command.

mod backup;
mod records;
mod session;
mod state;
mod status;
mod vault_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use creatorvault_core::{Category, VaultError};

use crate::session::Session;

/// CreatorVault - an encrypted local vault for creator dashboard data.
#[derive(Parser, Debug)]
#[command(name = "creatorvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a vault protected by a new passphrase.
    Init,
    /// Check the vault passphrase.
    Unlock,
    /// Show vault state, storage health and record counts.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Change the vault passphrase.
    Passwd,
    /// Read and write encrypted application state.
    State {
        #[command(subcommand)]
        action: StateCommands,
    },
    /// Read and write per-category records.
    Records {
        #[command(subcommand)]
        action: RecordsCommands,
    },
    /// Export a backup file.
    Export {
        /// Category to include (repeatable). Defaults to `backup.default_categories`.
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
        /// Output path. Defaults to a timestamped file in `backup.directory`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore categories from a backup file.
    Import {
        /// The backup file.
        file: PathBuf,
        /// Category to restore (repeatable). Defaults to `backup.default_categories`.
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
        /// Ask for the backup's passphrase up front.
        #[arg(long)]
        backup_password: bool,
    },
    /// Destroy the vault and all stored data. There is no undo.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum StateCommands {
    /// Print the value under a key.
    Get { key: String },
    /// Store a JSON value under a key.
    Set { key: String, json: String },
    /// Remove a key.
    Rm { key: String },
}

#[derive(Subcommand, Debug)]
enum RecordsCommands {
    /// Print a category's records.
    List {
        #[arg(value_parser = parse_category)]
        category: Category,
    },
    /// Replace a category's records with the JSON array in a file.
    Put {
        #[arg(value_parser = parse_category)]
        category: Category,
        file: PathBuf,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse::<Category>().map_err(|_| {
        let valid: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        format!("unknown category `{s}` (expected one of: {})", valid.join(", "))
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => creatorvault_config::load_and_validate_path(path),
        None => creatorvault_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            creatorvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let Some(command) = cli.command else {
        println!("creatorvault: use --help for available commands");
        return;
    };

    if let Commands::Reset { yes: false } = command {
        eprintln!(
            "{}: reset destroys the vault and every stored record; pass --yes to confirm",
            "refusing".red()
        );
        std::process::exit(2);
    }

    let mut session = match Session::open(config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            std::process::exit(1);
        }
    };

    let result = run(&mut session, command).await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to checkpoint database");
    }
    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(session: &mut Session, command: Commands) -> Result<(), VaultError> {
    match command {
        Commands::Init => vault_cmd::run_init(session).await,
        Commands::Unlock => vault_cmd::run_unlock(session).await,
        Commands::Status { json } => status::run_status(session, json).await,
        Commands::Passwd => vault_cmd::run_passwd(session).await,
        Commands::State { action } => match action {
            StateCommands::Get { key } => state::run_get(session, &key).await,
            StateCommands::Set { key, json } => state::run_set(session, &key, &json).await,
            StateCommands::Rm { key } => state::run_rm(session, &key).await,
        },
        Commands::Records { action } => match action {
            RecordsCommands::List { category } => records::run_list(session, category).await,
            RecordsCommands::Put { category, file } => {
                records::run_put(session, category, &file).await
            }
        },
        Commands::Export { categories, out } => backup::run_export(session, &categories, out)
            .await
            .map(|_| ()),
        Commands::Import {
            file,
            categories,
            backup_password,
        } => backup::run_import(session, &file, &categories, backup_password)
            .await
            .map(|_| ()),
        Commands::Reset { .. } => vault_cmd::run_reset(session).await,
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("creatorvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
