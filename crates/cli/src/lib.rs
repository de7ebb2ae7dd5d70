pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use sweetshop_core::config::{AppConfig, LoadOptions, LogFormat};

use crate::commands::browse::BrowseArgs;
use crate::commands::mutate::{AddArgs, EditArgs};

#[derive(Debug, Parser)]
#[command(
    name = "sweetshop",
    about = "Sweetshop catalog CLI",
    long_about = "Browse and administer an in-memory confectionery catalog. Every invocation starts from the seed catalog; nothing is persisted.",
    after_help = "Examples:\n  sweetshop browse --text gummy --max-price 5\n  sweetshop purchase 1\n  sweetshop restock 4 24\n  sweetshop config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List products matching name text, category and price range")]
    Browse(BrowseArgs),
    #[command(about = "List the distinct product categories")]
    Categories,
    #[command(about = "Buy one unit of a product")]
    Purchase { id: String },
    #[command(about = "Add units to a product's stock")]
    Restock {
        id: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    #[command(about = "Add a new product to the catalog")]
    Add(AddArgs),
    #[command(about = "Change fields of an existing product")]
    Edit(EditArgs),
    #[command(about = "Remove a product from the catalog")]
    Delete { id: String },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Browse(args) => commands::browse::run(args),
        Command::Categories => commands::browse::run_categories(),
        Command::Purchase { id } => commands::mutate::purchase(id),
        Command::Restock { id, amount } => commands::mutate::restock(id, amount),
        Command::Add(args) => commands::mutate::add(args),
        Command::Edit(args) => commands::mutate::edit(args),
        Command::Delete { id } => commands::mutate::delete(id),
        Command::Config => commands::CommandResult { exit_code: 0, output: commands::config::run() },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

// Logs go to stderr so stdout carries only the JSON payload.
fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.trim().parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
