use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ConfigManager;
use crate::repository::BookRepository;

#[derive(Parser)]
#[clap(name = "bookstore", about = "Query the shared bookstore database")]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up books by exact name
    Query {
        /// book name to search for
        name: String,
    },
    /// Print the effective database settings
    ShowConfig,
    /// Write the effective settings out as the config file
    InitConfig,
}

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Query { name } => run_query(name),
        Command::ShowConfig => show_config(),
        Command::InitConfig => init_config(),
    }
}

#[tokio::main]
async fn run_query(name: String) -> Result<()> {
    crate::logging::init_tracing()?;

    let repository = BookRepository::new()
        .await
        .context("Failed to initialize the database handle")?;

    let rows = repository
        .get_book_by_name(&name)
        .await
        .context("Failed to query books")?;

    for row in &rows {
        println!("{}", serde_json::to_string(row)?);
    }
    if rows.is_empty() {
        println!("no books found with name {name:?}");
    }

    Ok(())
}

fn init_config() -> Result<()> {
    let settings = ConfigManager::load_settings();
    settings
        .validate()
        .context("Refusing to write invalid settings")?;
    ConfigManager::save_settings(&settings)?;

    println!("Config file written.");
    Ok(())
}

fn show_config() -> Result<()> {
    let settings = ConfigManager::load_settings();

    println!("host            = {}", settings.host);
    println!("port            = {}", settings.port);
    println!("user            = {}", settings.user);
    println!("password        = ********");
    println!("dbname          = {}", settings.dbname);
    println!("min_connections = {}", settings.min_connections);
    println!("max_connections = {}", settings.max_connections);

    Ok(())
}
