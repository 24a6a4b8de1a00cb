//! Application state and the transitions that change it.
//!
//! [`Shell`] is the only writer of [`AppState`]. Presentation code reads the
//! state through [`Shell::state`] and reports user actions by calling the
//! named transitions. Network failures are logged and swallowed: the state
//! keeps whatever it showed before.
//!
//! The async transitions borrow the shell mutably, so they run one at a time
//! and never see a stale response. A caller that wants requests in flight
//! together splits them up: [`Shell::issue`] a ticket per request, fetch
//! through [`Shell::provider`], then hand each result to the matching
//! `apply_*`, which drops it if a newer ticket of the same kind was issued.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    Config,
    error::WeatherError,
    favorites::{Favorites, FavoritesStore},
    model::{City, CurrentWeather, ForecastEntry},
    provider::{WeatherProvider, provider_from_config},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Favorites,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Pending text of the city input.
    pub city: String,
    pub weather: Option<CurrentWeather>,
    pub forecast: Option<Vec<ForecastEntry>>,
    pub matching_cities: Vec<City>,
    pub favorites: Favorites,
    pub view: View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Current,
    Forecast,
    CitySearch,
}

/// Identifies one issued request. Only the most recently issued ticket of a
/// kind may update state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: RequestKind,
    generation: u64,
}

#[derive(Debug, Default)]
struct Generations {
    current: u64,
    forecast: u64,
    city_search: u64,
}

impl Generations {
    fn latest(&self, kind: RequestKind) -> u64 {
        match kind {
            RequestKind::Current => self.current,
            RequestKind::Forecast => self.forecast,
            RequestKind::CitySearch => self.city_search,
        }
    }

    fn issue(&mut self, kind: RequestKind) -> Ticket {
        let slot = match kind {
            RequestKind::Current => &mut self.current,
            RequestKind::Forecast => &mut self.forecast,
            RequestKind::CitySearch => &mut self.city_search,
        };
        *slot += 1;

        Ticket { kind, generation: *slot }
    }

    fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest(ticket.kind) == ticket.generation
    }
}

#[derive(Debug)]
pub struct Shell {
    state: AppState,
    provider: Arc<dyn WeatherProvider>,
    store: FavoritesStore,
    forecast_count: usize,
    generations: Generations,
}

impl Shell {
    /// Starts on the home view with the persisted favorites.
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        store: FavoritesStore,
        forecast_count: usize,
    ) -> Self {
        let favorites = store.load();
        info!(count = favorites.len(), "loaded favorites");

        Self {
            state: AppState {
                favorites,
                ..AppState::default()
            },
            provider: Arc::from(provider),
            store,
            forecast_count,
            generations: Generations::default(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = FavoritesStore::in_dir(config.storage_dir()?);
        Self::with_store(config, store)
    }

    /// Same as [`Shell::from_config`], but favorites start empty and are
    /// never written to disk.
    pub fn scratch_from_config(config: &Config) -> anyhow::Result<Self> {
        Self::with_store(config, FavoritesStore::in_memory())
    }

    fn with_store(config: &Config, store: FavoritesStore) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        Ok(Self::new(provider, store, config.forecast_count))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shared handle to the provider, for fetching outside a transition.
    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    pub fn set_city(&mut self, text: impl Into<String>) {
        self.state.city = text.into();
    }

    /// Fetches current conditions, then the forecast, for the pending city.
    ///
    /// The forecast request is issued whether or not the first one succeeded.
    pub async fn search_weather(&mut self) {
        let city = self.state.city.clone();

        let ticket = self.issue(RequestKind::Current);
        let current = self.provider.fetch_current(&city).await;
        self.apply_current(ticket, &city, current);

        let ticket = self.issue(RequestKind::Forecast);
        let forecast = self.provider.fetch_forecast(&city, self.forecast_count).await;
        self.apply_forecast(ticket, &city, forecast);
    }

    /// Looks up cities matching the pending text; fired when the city input
    /// gains focus.
    pub async fn handle_city_search(&mut self) {
        let partial = self.state.city.clone();

        let ticket = self.issue(RequestKind::CitySearch);
        let result = self.provider.search_cities(&partial).await;
        self.apply_matches(ticket, &partial, result);
    }

    pub fn handle_city_select(&mut self, city: &City) {
        self.state.city = city.name.clone();
        self.state.matching_cities.clear();
    }

    /// Saves `city` unless a favorite with the same id exists.
    pub fn handle_add_to_favorites(&mut self, city: &City) -> bool {
        if !self.state.favorites.add(city.clone()) {
            debug!(id = city.id, "already a favorite");
            return false;
        }
        self.persist_favorites();
        true
    }

    pub fn handle_remove_from_favorites(&mut self, city: &City) -> bool {
        if !self.state.favorites.remove(city.id) {
            debug!(id = city.id, "not a favorite");
            return false;
        }
        self.persist_favorites();
        true
    }

    pub fn navigate(&mut self, view: View) {
        self.state.view = view;
    }

    /// Marks every earlier request of `kind` as stale.
    pub fn issue(&mut self, kind: RequestKind) -> Ticket {
        self.generations.issue(kind)
    }

    /// Applies a current-conditions result. Returns `false` when the ticket
    /// was superseded and the result dropped.
    pub fn apply_current(
        &mut self,
        ticket: Ticket,
        city: &str,
        result: Result<CurrentWeather, WeatherError>,
    ) -> bool {
        if !self.accept(ticket) {
            return false;
        }

        match result {
            Ok(weather) => {
                info!(city, "current conditions updated");
                self.state.weather = Some(weather);
                self.state.city.clear();
            }
            Err(e) => error!(city, error = %e, "current conditions request failed"),
        }
        true
    }

    pub fn apply_forecast(
        &mut self,
        ticket: Ticket,
        city: &str,
        result: Result<Vec<ForecastEntry>, WeatherError>,
    ) -> bool {
        if !self.accept(ticket) {
            return false;
        }

        match result {
            Ok(mut entries) => {
                entries.truncate(self.forecast_count);
                info!(city, entries = entries.len(), "forecast updated");
                self.state.forecast = Some(entries);
            }
            Err(e) => error!(city, error = %e, "forecast request failed"),
        }
        true
    }

    pub fn apply_matches(
        &mut self,
        ticket: Ticket,
        partial: &str,
        result: Result<Vec<City>, WeatherError>,
    ) -> bool {
        if !self.accept(ticket) {
            return false;
        }

        self.state.matching_cities = match result {
            Ok(cities) => cities,
            Err(e) => {
                error!(partial, error = %e, "city search failed");
                Vec::new()
            }
        };
        true
    }

    fn accept(&self, ticket: Ticket) -> bool {
        let latest = self.generations.is_latest(ticket);
        if !latest {
            debug!(
                kind = ?ticket.kind,
                generation = ticket.generation,
                "discarding stale response"
            );
        }
        latest
    }

    fn persist_favorites(&self) {
        if let Err(e) = self.store.save(&self.state.favorites) {
            error!(error = %e, "failed to save favorites");
        }
    }
}
