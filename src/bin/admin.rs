//! CLI administration tool for shortlink.
//!
//! Encodes and decodes tokens offline, and shortens or resolves links
//! against the database through the same gateway the server uses.
//!
//! # Usage
//!
//! ```bash
//! # Token for an id, and back
//! cargo run --bin admin -- encode 42
//! cargo run --bin admin -- decode kK
//!
//! # Shorten a URL / resolve a token against the database
//! cargo run --bin admin -- shorten https://example.com/page
//! cargo run --bin admin -- resolve kK
//!
//! # Raw gateway request
//! cargo run --bin admin -- request shortlink.find_by_id '{"id": 1}'
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `HASH_SALT`, `TOKEN_MIN_LENGTH`: must match the server's
//! - `DATABASE_URL` (or `DB_*` components): for database commands

use shortlink::application::services::DedupStore;
use shortlink::config::{self, AppEnv, TokenSettings};
use shortlink::infrastructure::persistence::PgLinkStore;
use shortlink::messaging::{Address, Gateway, GatewayClient, SendError};
use shortlink::utils::token_codec::TokenCodec;
use shortlink::utils::url_validator::validate_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// How long to wait for a gateway reply, in milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the token for an id
    Encode { id: u64 },

    /// Print the id behind a token
    Decode { token: String },

    /// Store a URL (or find it) and print its token
    Shorten { url: String },

    /// Print the URL behind a token
    Resolve { token: String },

    /// Send a raw JSON payload to a gateway address
    Request {
        /// e.g. `shortlink.find_by_id`
        address: String,
        /// JSON body, e.g. `{"id": 1}`
        body: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout_ms);

    match cli.command {
        Commands::Encode { id } => {
            let codec = load_codec()?;
            println!("{}", codec.generate(id).bright_yellow().bold());
        }
        Commands::Decode { token } => {
            let codec = load_codec()?;
            match codec.reverse(&token) {
                Some(id) => println!("{}", id.to_string().bright_green().bold()),
                None => anyhow::bail!("'{token}' is not a token for this salt"),
            }
        }
        Commands::Shorten { url } => shorten(&url, timeout).await?,
        Commands::Resolve { token } => resolve(&token, timeout).await?,
        Commands::Request { address, body } => request(&address, &body, timeout).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

fn load_codec() -> Result<TokenCodec> {
    let environment = match std::env::var("APP_ENV") {
        Ok(value) => value.parse()?,
        Err(_) => AppEnv::default(),
    };

    let settings = TokenSettings::from_env()?;
    settings.validate(environment)?;

    if settings.uses_default_salt() {
        eprintln!("{}", "⚠️  HASH_SALT is not set, using the built-in salt".yellow());
    }

    Ok(settings.codec())
}

async fn connect() -> Result<PgPool> {
    let database_url = config::load_database_url()?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

/// Spawns a gateway over the database for the duration of one command.
async fn gateway(timeout: Duration) -> Result<GatewayClient> {
    let pool = connect().await?;
    let store = DedupStore::new(Arc::new(PgLinkStore::new(pool)));
    let (client, _handle) = Gateway::new(store).spawn(16, timeout);
    Ok(client)
}

async fn shorten(url: &str, timeout: Duration) -> Result<()> {
    validate_url(url)?;
    let codec = load_codec()?;

    let reply = gateway(timeout).await?.find_or_create(url).await?;
    let token = codec.generate(reply.id);

    let status = if reply.created == Some(true) {
        "created".green()
    } else {
        "existing".bright_black()
    };

    println!("  URL:   {}", reply.url.cyan());
    println!("  ID:    {}", reply.id.to_string().bright_white());
    println!("  Token: {} ({})", token.bright_yellow().bold(), status);

    Ok(())
}

async fn resolve(token: &str, timeout: Duration) -> Result<()> {
    let codec = load_codec()?;
    let id = codec
        .reverse(token)
        .with_context(|| format!("'{token}' is not a token for this salt"))?;

    match gateway(timeout).await?.find_by_id(id).await {
        Ok(reply) => {
            println!("  ID:  {}", reply.id.to_string().bright_white());
            println!("  URL: {}", reply.url.cyan());
            Ok(())
        }
        Err(SendError::Failed(failure)) => {
            anyhow::bail!("{} (code {})", failure.message, failure.code.as_u8())
        }
        Err(e) => Err(e.into()),
    }
}

async fn request(address: &str, body: &str, timeout: Duration) -> Result<()> {
    let body: serde_json::Value = serde_json::from_str(body).context("Body is not valid JSON")?;

    let result = match address.parse::<Address>() {
        Ok(address) => gateway(timeout).await?.request(address, body).await,
        Err(failure) => Err(SendError::Failed(failure)),
    };

    match result {
        Ok(reply) => println!("{}", serde_json::to_string_pretty(&reply)?),
        Err(SendError::Failed(failure)) => println!(
            "{} code={} message={}",
            "failure".red().bold(),
            failure.code.as_u8().to_string().bright_white(),
            failure.message
        ),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
