//! # Storefront CLI
//!
//! Command-line runner over the storefront data-access layer.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  storefront init                 create missing tables and indexes      │
//! │  storefront demo                 insert/list/update/delete walkthrough  │
//! │                                  followed by the sales reports          │
//! │  storefront report [NAME]        one reporting query as JSON            │
//! │                                  (no name: list the reports)            │
//! │  storefront users [FLAGS]        filter users    → FilterResponse JSON  │
//! │  storefront products [FLAGS]     filter products → FilterResponse JSON  │
//! │  storefront health               exit 0 if the database answers         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Connection settings come from `DATABASE_URL` or `PG*` (see
//! `storefront_db::config`). Logs go to stderr, results to stdout.

mod demo;
mod filters;

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use storefront_db::analytics::DEFAULT_MIN_DISTINCT_PRODUCTS;
use storefront_db::{Database, DbConfig, Report};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::filters::{ProductArgs, UserArgs};

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Storefront PostgreSQL data-access CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create missing tables, indexes and upgrades
    Init,

    /// Walk through CRUD on a user and a product, then print the reports
    Demo,

    /// Run one reporting query
    Report {
        /// Report name, e.g. sales_rollup (omit to list them)
        name: Option<Report>,

        /// Threshold for users_with_many_products
        #[arg(long, default_value_t = DEFAULT_MIN_DISTINCT_PRODUCTS)]
        min_products: i64,
    },

    /// Filter users
    Users(UserArgs),

    /// Filter products
    Products(ProductArgs),

    /// Check that the database answers
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(initialize_schema: bool) -> anyhow::Result<Database> {
    let config = DbConfig::from_env()
        .context("invalid database configuration")?
        .initialize_schema(initialize_schema);

    Database::new(config)
        .await
        .context("could not open the database")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Init => {
            connect(true).await?;
            info!("Schema is up to date");
        }

        Command::Demo => {
            let db = connect(true).await?;
            demo::run(&db).await?;
            db.close().await;
        }

        Command::Report { name: None, .. } => {
            for report in Report::ALL {
                println!("{report}");
            }
        }

        Command::Report {
            name: Some(report),
            min_products,
        } => {
            let db = connect(false).await?;
            let rows = match report {
                Report::UsersWithManyProducts => serde_json::to_value(
                    db.analytics().users_with_many_products(min_products).await?,
                )?,
                other => db.analytics().run(other).await?,
            };
            print_json(&rows)?;
        }

        Command::Users(args) => {
            let db = connect(false).await?;
            let options = args.into_options()?;
            print_json(&db.users().filter(&options).await?)?;
        }

        Command::Products(args) => {
            let db = connect(false).await?;
            let options = args.into_options()?;
            print_json(&db.products().filter(&options).await?)?;
        }

        Command::Health => {
            let db = connect(false).await?;
            let healthy = db.health_check().await;
            print_json(&serde_json::json!({ "healthy": healthy }))?;
            if !healthy {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_name_parses() {
        let cli = Cli::try_parse_from(["storefront", "report", "sales-cube"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Report {
                name: Some(Report::SalesCube),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_report_rejected() {
        assert!(Cli::try_parse_from(["storefront", "report", "nope"]).is_err());
    }
}
