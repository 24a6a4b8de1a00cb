use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::WeatherError,
    model::{City, Coord, CurrentWeather, ForecastEntry},
};

use super::WeatherProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(WeatherError::Client)?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `{base_url}/{endpoint}` with `q=subject`, mapping status codes to
    /// [`WeatherError`] and decoding the body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        subject: &str,
        extra: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", subject), ("appid", self.api_key.as_str())])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, endpoint, "OpenWeather responded");

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(subject.to_string()));
        }

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::malformed(format!("{endpoint}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: u64,
    name: String,
    dt: Option<i64>,
    sys: Option<OwSys>,
    coord: Option<OwCoord>,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwFindEntry {
    id: u64,
    name: String,
    sys: Option<OwSys>,
    coord: Option<OwCoord>,
}

#[derive(Debug, Deserialize)]
struct OwFindResponse {
    #[serde(default)]
    list: Vec<OwFindEntry>,
}

impl From<OwCoord> for Coord {
    fn from(c: OwCoord) -> Self {
        Coord { lat: c.lat, lon: c.lon }
    }
}

fn country_of(sys: Option<OwSys>) -> String {
    sys.and_then(|s| s.country).unwrap_or_default()
}

fn first_description(weather: Vec<OwWeather>, what: &str) -> Result<String, WeatherError> {
    weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| WeatherError::malformed(format!("{what} has no weather description")))
}

impl TryFrom<OwCurrentResponse> for CurrentWeather {
    type Error = WeatherError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        let description = first_description(parsed.weather, "current conditions")?;

        Ok(CurrentWeather {
            id: parsed.id,
            name: parsed.name,
            country: country_of(parsed.sys),
            coord: parsed.coord.map(Coord::from),
            description,
            temp_kelvin: parsed.main.temp,
            observed_at: parsed.dt.and_then(unix_to_utc),
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastEntry {
    type Error = WeatherError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        Ok(ForecastEntry {
            description: first_description(entry.weather, "forecast entry")?,
            temp_kelvin: entry.main.temp,
            at: entry.dt.and_then(unix_to_utc),
        })
    }
}

impl From<OwFindEntry> for City {
    fn from(entry: OwFindEntry) -> Self {
        City {
            id: entry.id,
            name: entry.name,
            country: country_of(entry.sys),
            coord: entry.coord.map(Coord::from),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city, &[]).await?;
        CurrentWeather::try_from(parsed)
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_forecast(
        &self,
        city: &str,
        count: usize,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json("forecast", city, &[("cnt", count.to_string())])
            .await?;

        parsed
            .list
            .into_iter()
            .take(count)
            .map(ForecastEntry::try_from)
            .collect()
    }

    #[instrument(skip(self), level = "debug")]
    async fn search_cities(&self, partial: &str) -> Result<Vec<City>, WeatherError> {
        let parsed: OwFindResponse = self.get_json("find", partial, &[]).await?;
        Ok(parsed.list.into_iter().map(City::from).collect())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
