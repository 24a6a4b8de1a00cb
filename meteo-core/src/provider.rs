use crate::{
    Config,
    error::WeatherError,
    model::{City, CurrentWeather, ForecastEntry},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only access to a remote weather service.
///
/// The query strings are passed through untouched; callers decide whether an
/// empty string is worth sending.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError>;

    /// Up to `count` short-range forecast points, in API order.
    async fn fetch_forecast(
        &self,
        city: &str,
        count: usize,
    ) -> Result<Vec<ForecastEntry>, WeatherError>;

    async fn search_cities(&self, partial: &str) -> Result<Vec<City>, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::with_base_url(api_key.to_owned(), config.base_url())?;

    Ok(Box::new(provider))
}
