//! CLI administration tool for url-shortener.
//!
//! Manages short links directly against the database, without HTTP access
//! and without rate limits. Deletes go through the same service as the API,
//! so cached redirects are invalidated too.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL
//! cargo run --bin admin -- shorten https://example.com/a --alias promo25 --days 7
//!
//! # Look up a code
//! cargo run --bin admin -- resolve promo25
//!
//! # Delete by code or by long URL
//! cargo run --bin admin -- delete --code promo25
//! cargo run --bin admin -- delete --url https://example.com/a -y
//!
//! # List stored links
//! cargo run --bin admin -- list --page 1 --limit 20
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see [`url_shortener::config`]). `DATABASE_URL` is required;
//! `REDIS_URL` enables cache invalidation on delete.

use url_shortener::application::services::{CreateOutcome, DEFAULT_EXPIRES_IN_DAYS, ShortenerService};
use url_shortener::config::{self, Config};
use url_shortener::domain::entities::{DeleteFilter, UrlRecord};
use url_shortener::infrastructure::persistence::PgUrlRegistry;
use url_shortener::server;
use url_shortener::utils::code_generator::EntropyCodeGenerator;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing url-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL
    Shorten {
        /// The long URL (http or https)
        url: String,

        /// Custom alias, 6-8 letters or digits
        #[arg(short, long)]
        alias: Option<String>,

        /// Lifetime in days
        #[arg(short, long, default_value_t = DEFAULT_EXPIRES_IN_DAYS, allow_negative_numbers = true)]
        days: i64,
    },

    /// Show where a short code points
    Resolve {
        code: String,
    },

    /// Delete a link by code or long URL
    #[command(group(ArgGroup::new("target").required(true).args(["code", "url"])))]
    Delete {
        #[arg(short, long)]
        code: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List stored links, newest first
    List {
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(short, long, default_value_t = 20)]
        limit: i64,
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
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = server::connect_database(&config).await?;

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        command => {
            let service = build_service(&config, pool).await;
            handle_link_command(command, &service, &config.base_url).await?;
        }
    }

    Ok(())
}

/// Builds the shortener over PostgreSQL, with the configured cache.
async fn build_service(config: &Config, pool: PgPool) -> ShortenerService {
    let registry = Arc::new(PgUrlRegistry::new(Arc::new(pool)));
    let cache = server::build_cache(config).await;

    ShortenerService::new(
        registry,
        cache,
        Arc::new(EntropyCodeGenerator),
        config.shortener_settings(),
    )
}

/// Dispatches link management commands.
async fn handle_link_command(
    command: Commands,
    service: &ShortenerService,
    base_url: &str,
) -> Result<()> {
    match command {
        Commands::Shorten { url, alias, days } => {
            shorten(service, base_url, &url, alias.as_deref(), days).await
        }
        Commands::Resolve { code } => resolve(service, &code).await,
        Commands::Delete { code, url, yes } => delete(service, code, url, yes).await,
        Commands::List { page, limit } => list(service, page, limit).await,
        Commands::Db { .. } => Ok(()),
    }
}

/// Creates a short link and prints it.
async fn shorten(
    service: &ShortenerService,
    base_url: &str,
    url: &str,
    alias: Option<&str>,
    days: i64,
) -> Result<()> {
    println!("{}", "✂️  Shorten URL".bright_blue().bold());
    println!();

    match service.create(url, alias, days).await? {
        CreateOutcome::Created(record) => {
            println!("{}", "✅ Created".green().bold());
            print_record(&record, base_url);
        }
        CreateOutcome::AlreadyExists(record) => {
            println!("{}", "ℹ️  This URL is already shortened".yellow());
            print_record(&record, base_url);
        }
        CreateOutcome::CodeTaken => {
            println!(
                "{}",
                format!("❌ Alias '{}' is already in use", alias.unwrap_or_default()).red()
            );
        }
    }

    println!();
    Ok(())
}

/// Prints the target of a code, or that it is missing or expired.
async fn resolve(service: &ShortenerService, code: &str) -> Result<()> {
    match service.resolve(code).await? {
        Some(projection) => {
            println!("  {} → {}", code.cyan(), projection.long_url.bright_white());
            if let Some(expires_at) = projection.expires_at {
                println!(
                    "  Expires: {}",
                    expires_at.format("%Y-%m-%d %H:%M UTC").to_string().bright_black()
                );
            }
        }
        None => println!("{}", format!("  '{}' not found or expired", code).yellow()),
    }

    Ok(())
}

/// Deletes a link after confirmation.
///
/// # Safety
///
/// - Requires confirmation (default: No) unless `--yes`
async fn delete(
    service: &ShortenerService,
    code: Option<String>,
    url: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑️  Delete link".bright_blue().bold());
    println!();

    let filter = DeleteFilter::from_parts(code, url)
        .ok_or_else(|| anyhow::anyhow!("Provide exactly one non-empty --code or --url"))?;

    match &filter {
        DeleteFilter::ShortCode(code) => println!("  Code: {}", code.cyan()),
        DeleteFilter::LongUrl(url) => println!("  URL:  {}", url.cyan()),
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    if service.delete(filter).await? {
        println!("{}", "✅ Link deleted".green().bold());
    } else {
        println!("{}", "⚠️  Nothing matched".yellow());
    }
    println!();

    Ok(())
}

/// Lists links with expiry status.
///
/// # Output Format
///
/// ```text
/// 📋 Links (page 1)
///
///   Code      Created           Status   URL
///   ──────────────────────────────────────────────────────────────
///   promo25   2026-10-19 10:30  ACTIVE   https://example.com/a
///   x9Kq2b    2026-09-01 08:00  EXPIRED  https://example.com/b
/// ```
async fn list(service: &ShortenerService, page: i64, limit: i64) -> Result<()> {
    println!(
        "{}",
        format!("📋 Links (page {})", page).bright_blue().bold()
    );
    println!();

    let result = service.list(page, limit).await?;

    if result.items.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<9} {:<17} {:<8} {}",
        "Code".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for record in &result.items {
        let status = if record.is_expired() {
            "EXPIRED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<9} {:<17} {:<8} {}",
            record.short_code.cyan(),
            record
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status,
            record.long_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        result.total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

fn print_record(record: &UrlRecord, base_url: &str) {
    println!(
        "  Short URL: {}",
        format!("{}/{}", base_url.trim_end_matches('/'), record.short_code)
            .bright_yellow()
            .bold()
    );
    println!("  Long URL:  {}", record.long_url.cyan());
    if let Some(expires_at) = record.expires_at {
        println!(
            "  Expires:   {}",
            expires_at.format("%Y-%m-%d %H:%M UTC").to_string().bright_black()
        );
    }
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
