//! Command line front end for the country data cache.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use country_data::config::{
    ConfigError,
    ConfigManager,
};
use country_data::{
    Country,
    CountryCache,
    DataError,
    LocaleCode,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "country-data")]
#[command(version)]
#[command(about = "Query bundled ISO 3166 country data")]
struct Cli {
    /// Workspace containing `country-data.json` (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Locale to load translations for (repeatable; replaces the configured locales)
    #[arg(short, long = "locale", value_name = "LOCALE")]
    locales: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one country record as JSON
    Show {
        /// ISO 3166-1 alpha-2 code (case-insensitive)
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// List every known country code with its name
    List,

    /// List locale definitions found on disk (requested ones are starred)
    Locales,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Failed to resolve workspace: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Unknown country code '{0}'")]
    UnknownCountry(String),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "country-data failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let workspace = match cli.workspace {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(workspace))?;

    if let Some(invalid) = cli.locales.iter().find(|locale| !LocaleCode::new(locale).is_plain()) {
        return Err(DataError::InvalidLocale { code: invalid.clone() }.into());
    }

    let cache = config_manager.build_cache();
    if !cli.locales.is_empty() {
        cache.set_requested_locales(cli.locales.iter().map(String::as_str));
    }

    match cli.command {
        Commands::Show { code } => show(&cache, &code),
        Commands::List => list(&cache),
        Commands::Locales => {
            locales(&cache);
            Ok(())
        }
    }
}

#[allow(clippy::print_stdout)]
fn show(cache: &CountryCache, code: &str) -> Result<(), CliError> {
    let country =
        Country::new(cache, code)?.ok_or_else(|| CliError::UnknownCountry(code.to_string()))?;
    println!("{}", serde_json::to_string_pretty(country.data())?);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn list(cache: &CountryCache) -> Result<(), CliError> {
    for code in cache.list()? {
        let Some(record) = cache.get(code.as_str())? else {
            continue;
        };
        let country = Country::from_record(cache, record);
        println!("{code}\t{country}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn locales(cache: &CountryCache) {
    let requested = cache.requested_locales();
    for locale in cache.available_locales() {
        let marker = if requested.contains(&locale) { "*" } else { " " };
        println!("{marker} {locale}");
    }
}
