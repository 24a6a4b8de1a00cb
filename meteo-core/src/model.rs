use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// A place as identified by the weather API.
///
/// Two cities are the same favorite when their `id` matches; the other
/// fields are display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coord>,
}

impl City {
    /// `"Rome, IT"`, or just the name when the API gave no country.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Latest observed conditions for a city. Temperature stays in Kelvin until
/// it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub coord: Option<Coord>,
    pub description: String,
    pub temp_kelvin: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl CurrentWeather {
    /// The city record that "add to favorites" stores.
    pub fn city(&self) -> City {
        City {
            id: self.id,
            name: self.name.clone(),
            country: self.country.clone(),
            coord: self.coord,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub temp_kelvin: f64,
    pub description: String,
    pub at: Option<DateTime<Utc>>,
}

/// Kelvin to whole degrees Celsius, rounding halves toward positive infinity.
pub fn kelvin_to_celsius(kelvin: f64) -> i64 {
    (kelvin - KELVIN_OFFSET + 0.5).floor() as i64
}

pub fn format_celsius(kelvin: f64) -> String {
    format!("{}°C", kelvin_to_celsius(kelvin))
}
