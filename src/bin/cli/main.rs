mod app;
mod commands;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use lexicard_lib::flashcards::anki_connect::DEFAULT_ANKI_CONNECT_URL;

#[derive(Parser)]
#[command(name = "lexicard-cli", about = "Import LUTE terms into flashcard decks", version)]
struct Cli {
    /// Settings file (default: <config dir>/lexicard/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Local card collection directory
    #[arg(long, global = true)]
    collection: Option<PathBuf>,

    /// Write to a running Anki through AnkiConnect instead of the local collection
    #[arg(long, global = true)]
    anki_connect: bool,

    /// AnkiConnect address
    #[arg(long, global = true, default_value = DEFAULT_ANKI_CONNECT_URL)]
    anki_url: String,

    /// Field AnkiConnect duplicate lookups search
    #[arg(long, global = true, default_value = "Front")]
    front_field: String,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show the languages and term counts an import would pick up
    Languages {
        /// Path to lute.db (default: from settings)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Import terms into the selected deck
    Import(ImportArgs),

    /// Run the startup import if it is enabled in settings
    Startup,

    /// List decks in the target collection
    Decks {
        /// Create this deck first (local collection only)
        #[arg(long)]
        create: Option<String>,
    },

    /// List card models (note types) in the target collection
    Models,

    /// List cards in the local collection
    Cards {
        /// Only cards in this deck
        #[arg(long)]
        deck: Option<String>,
    },

    /// Read and change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Path to lute.db
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Language name or id
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub deck: Option<String>,
    /// Card model (note type)
    #[arg(long)]
    pub model: Option<String>,
    /// Only terms created in the last N days
    #[arg(long)]
    pub days: Option<u32>,
    /// Extra tag for every card (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub parents_only: bool,
    #[arg(long)]
    pub allow_empty_translation: bool,
    /// Include well-known (99) and ignored (98) terms
    #[arg(long)]
    pub include_wki: bool,
    /// Include terms with status 0
    #[arg(long)]
    pub include_unknown: bool,
    #[arg(long)]
    pub allow_duplicates: bool,
    /// Add the term's LUTE tag to its card
    #[arg(long)]
    pub import_tags: bool,
    /// Set the card ease from the term status
    #[arg(long)]
    pub adjust_ease: bool,
    /// Store these options as the new settings
    #[arg(long)]
    pub save: bool,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print every setting
    Show,
    /// Set one setting; the value is parsed as JSON, or taken as a string
    Set { key: String, value: String },
    /// Write defaults for any missing setting
    Init,
    /// Print the settings file path
    Path,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let app = app::App::new(
        cli.config.as_deref(),
        cli.collection.as_deref(),
        cli.anki_connect.then_some(cli.anki_url.as_str()),
        &cli.front_field,
    )?;

    match cli.command {
        Command::Languages { path } => {
            commands::languages::run(&app, path.as_deref(), &cli.format)?;
        }
        Command::Import(args) => {
            commands::import::run(&app, &args, &cli.format)?;
        }
        Command::Startup => {
            commands::startup::run(&app, &cli.format)?;
        }
        Command::Decks { create } => {
            commands::decks::run(&app, create.as_deref(), &cli.format)?;
        }
        Command::Models => {
            commands::models::run(&app, &cli.format)?;
        }
        Command::Cards { deck } => {
            commands::cards::run(&app, deck.as_deref(), &cli.format)?;
        }
        Command::Config(subcmd) => match subcmd {
            ConfigCommand::Show => commands::config::run_show(&app, &cli.format)?,
            ConfigCommand::Set { key, value } => commands::config::run_set(&app, &key, &value)?,
            ConfigCommand::Init => commands::config::run_init(&app, &cli.format)?,
            ConfigCommand::Path => println!("{}", app.settings.path().display()),
        },
    }

    Ok(())
}
