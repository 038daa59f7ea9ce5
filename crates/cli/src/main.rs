//! Cartwheel CLI - Database migrations and cart housekeeping.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cw-cli migrate
//!
//! # Load or refresh catalog products from YAML
//! cw-cli seed products --file catalog.yaml
//!
//! # Mark carts idle for 30+ days as abandoned
//! cw-cli sweep --older-than-days 30
//!
//! # Issue a bearer token for a user
//! cw-cli token create --user-id 42 --days 30
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed products` - Upsert catalog products
//! - `sweep` - Abandon stale active carts
//! - `token create` - Issue API bearer tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cartwheel_core::UserId;

mod commands;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Cartwheel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Mark active carts untouched for N days as abandoned
    Sweep {
        /// Idle days before a cart is abandoned (default: `CART_ABANDON_AFTER_DAYS` or 30)
        #[arg(long)]
        older_than_days: Option<u32>,
    },
    /// Manage API bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert catalog products from a YAML file
    Products {
        /// Path to the catalog YAML file
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new bearer token for a user
    Create {
        /// User the token authenticates as
        #[arg(short, long)]
        user_id: i32,

        /// Days until the token expires
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
        Commands::Sweep { older_than_days } => commands::sweep::run(older_than_days).await?,
        Commands::Token { action } => match action {
            TokenAction::Create { user_id, days } => {
                commands::token::create(UserId::new(user_id), days).await?;
            }
        },
    }
    Ok(())
}
