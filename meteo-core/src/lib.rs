//! Core library for the `meteo` weather lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Typed weather records and the OpenWeather client
//! - The locally persisted favorites list
//! - The application shell: state plus the transitions that mutate it
//!
//! It is used by `meteo-cli`, but can also be driven by other front ends.

pub mod config;
pub mod error;
pub mod favorites;
pub mod model;
pub mod provider;
pub mod shell;

pub use config::Config;
pub use error::{StoreError, WeatherError};
pub use favorites::{Favorites, FavoritesStore};
pub use model::{City, CurrentWeather, ForecastEntry, format_celsius};
pub use provider::WeatherProvider;
pub use shell::{AppState, Shell, View};
