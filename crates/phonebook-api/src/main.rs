//! Phonebook server
//!
//! `phonebook-server [serve]` runs the HTTP API; `phonebook-server migrate`
//! brings a database file up to the current schema and exits.

use anyhow::Context;
use clap::Parser;
use phonebook_api::config::{migrate_database, Cli, Commands, ServeArgs};
use phonebook_api::{server, ServerConfig};
use phonebook_core::logging_facility::{self, Profile};
use phonebook_store::{db, migrations};

fn migrate(database: &str) -> anyhow::Result<()> {
    let mut conn = db::open(database).with_context(|| format!("opening {}", database))?;
    migrations::apply_migrations(&mut conn).context("applying migrations")?;
    let applied = migrations::applied_migrations(&conn)?;
    println!("{}: {} migration(s) applied", database, applied.len());
    for id in applied {
        println!("  {}", id);
    }
    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig::from_cli_and_env(args)?;
    logging_facility::init(config.log_profile);
    server::run(config).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Migrate { database }) => {
            logging_facility::init(Profile::Development);
            migrate(&migrate_database(database))
        }
        Some(Commands::Serve(args)) => serve(args).await,
        None => serve(ServeArgs::default()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
