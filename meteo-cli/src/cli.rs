use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, CustomUserError, Password, PasswordDisplayMode, validator::Validation};
use meteo_core::{Config, FavoritesStore, Shell};
use tracing::info;

use crate::{interactive, panels};

/// OpenWeather accepts at most 40 forecast points per request.
const MAX_FORECAST_COUNT: usize = 40;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather lookup with favorites")]
pub struct Cli {
    /// Starts the interactive app when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive app: search, current conditions, forecast, favorites.
    Run {
        /// Keep favorites in memory only; nothing is read from or saved to disk.
        #[arg(long)]
        scratch: bool,
    },

    /// Configure the OpenWeather API key and forecast length.
    Configure,

    /// Show current conditions and the forecast for a city.
    Show {
        /// City name, e.g. "Rome" or "Rome,IT".
        city: String,
    },

    /// List cities matching a (partial) name.
    Search {
        partial: String,
    },

    /// Show or edit saved favorites.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesCommand>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List saved cities with their ids.
    List,

    /// Remove a saved city by id.
    Remove { id: u64 },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Run { scratch: false }) {
            Command::Run { scratch } => {
                let mut shell = if scratch {
                    info!("scratch mode: favorites are not saved");
                    Shell::scratch_from_config(&config)?
                } else {
                    Shell::from_config(&config)?
                };
                interactive::run(&mut shell).await?;
            }
            Command::Configure => configure(config)?,
            Command::Show { city } => {
                let mut shell = Shell::from_config(&config)?;
                shell.set_city(city);
                shell.search_weather().await;

                let state = shell.state();
                for panel in [
                    panels::weather_panel(state.weather.as_ref()),
                    panels::forecast_panel(state.forecast.as_deref()),
                ]
                .into_iter()
                .flatten()
                {
                    println!("{panel}\n");
                }
            }
            Command::Search { partial } => {
                let mut shell = Shell::from_config(&config)?;
                shell.set_city(partial);
                shell.handle_city_search().await;

                for city in &shell.state().matching_cities {
                    println!("{}", panels::city_row(city));
                }
            }
            Command::Favorites { action } => {
                let store = FavoritesStore::in_dir(config.storage_dir()?);
                let mut favorites = store.load();

                match action.unwrap_or(FavoritesCommand::List) {
                    FavoritesCommand::List => {
                        println!("{}", panels::favorites_panel_with_ids(&favorites));
                    }
                    FavoritesCommand::Remove { id } => {
                        if favorites.remove(id) {
                            store.save(&favorites).context("Failed to save favorites")?;
                            println!("Removed {id} from favorites.");
                        } else {
                            println!("No favorite with id {id}.");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let forecast_count = CustomType::<usize>::new("Forecast entries:")
        .with_default(config.forecast_count)
        .with_error_message("Please enter a whole number")
        .with_validator(validate_forecast_count)
        .prompt()
        .context("Failed to read forecast length")?;

    config.set_api_key(api_key.trim().to_string());
    config.forecast_count = forecast_count;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn validate_forecast_count(n: &usize) -> Result<Validation, CustomUserError> {
    if (1..=MAX_FORECAST_COUNT).contains(n) {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid(
            format!("Must be between 1 and {MAX_FORECAST_COUNT}").into(),
        ))
    }
}
