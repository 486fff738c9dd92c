//! dadjoke CLI
//!
//! Prints one joke to stdout per run. Diagnostics go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dadjoke::{
    error::Result,
    models::{Config, Language, default_db_dir},
    pipeline,
    services::{HttpSource, SyncOutcome},
    storage::SqliteStore,
};

/// dadjoke - a joke you have not heard yet
#[derive(Parser, Debug)]
#[command(name = "dadjoke", version, about = "Prints a joke you have not seen yet")]
struct Cli {
    /// Path to a TOML config file (default: {db_dir}/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory to store the SQLite database
    #[arg(long, env = "DADJOKE_DB_DIR", global = true)]
    db_dir: Option<PathBuf>,

    /// Joke language: "en" (live API) or "de" (curated list)
    #[arg(short, long, env = "DADJOKE_LANGUAGE", global = true)]
    language: Option<Language>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Print one joke (default)
    Joke,

    /// Re-fetch the curated German joke list now
    Sync,

    /// Validate configuration
    Validate,

    /// Show what the joke store holds
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Resolve configuration: defaults, then the TOML file, then env and flags.
fn load_config(cli: &Cli) -> Config {
    let config_path = cli.config.clone().unwrap_or_else(|| {
        cli.db_dir
            .clone()
            .unwrap_or_else(default_db_dir)
            .join("config.toml")
    });

    let mut config = Config::load_or_default(&config_path);
    log::debug!("Using config file {}", config_path.display());

    if let Some(db_dir) = &cli.db_dir {
        config.storage.db_dir = db_dir.clone();
    }
    if let Some(language) = cli.language {
        config.language = language;
    }
    config
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli);
    let command = cli.command.unwrap_or(Command::Joke);

    config.validate()?;
    if let Command::Validate = command {
        println!("Configuration OK");
        return Ok(());
    }

    let db_path = config.storage.db_path();
    let store = SqliteStore::open(&db_path).await?;
    log::info!("Database initialized at {}", db_path.display());

    let result = execute(command, &config, &store).await;
    store.close().await;
    result
}

async fn execute(command: Command, config: &Config, store: &SqliteStore) -> Result<()> {
    match command {
        Command::Joke => {
            let source = HttpSource::new(&config.fetch)?;
            let joke = pipeline::run_joke(config, store, &source).await?;
            println!("{joke}");
        }

        Command::Sync => {
            let source = HttpSource::new(&config.fetch)?;
            if let SyncOutcome::Synced {
                extracted,
                inserted,
                failed,
            } = pipeline::run_sync(config, store, &source).await?
            {
                println!("Synced {extracted} jokes ({inserted} new, {failed} failed)");
            }
        }

        Command::Info => {
            let info = pipeline::run_info(store).await?;
            println!("Database: {}", config.storage.db_path().display());
            for (language, stats) in &info.languages {
                println!(
                    "{}: {} jokes ({} shown, {} unshown)",
                    language,
                    stats.total,
                    stats.shown,
                    stats.unshown()
                );
            }
            match info.last_sync {
                Some(ts) => println!("Last curated sync: {}", ts.to_rfc3339()),
                None => println!("Last curated sync: never"),
            }
        }

        Command::Validate => {}
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dadjoke: {e}");
            ExitCode::FAILURE
        }
    }
}
