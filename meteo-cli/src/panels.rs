//! Presentation panels.
//!
//! Every function here is a pure projection of [`AppState`]: text to print,
//! plus the list of actions a view offers. Nothing in this module mutates
//! state; the interactive loop forwards the chosen action to the shell.

use std::fmt;

use meteo_core::{AppState, City, CurrentWeather, Favorites, ForecastEntry, View, format_celsius};

pub fn nav_bar(view: View) -> String {
    let (home, favorites) = match view {
        View::Home => ("[Home]", "Favorites"),
        View::Favorites => ("Home", "[Favorites]"),
    };
    format!("Meteo  {home}  {favorites}")
}

pub fn search_panel(state: &AppState) -> String {
    let mut out = if state.city.is_empty() {
        "City: (enter a city)".to_string()
    } else {
        format!("City: {}", state.city)
    };

    if !state.matching_cities.is_empty() {
        out.push_str("\nMatching cities:");
        for city in &state.matching_cities {
            out.push_str(&format!("\n  {}", city.label()));
        }
    }
    out
}

/// Conditions card, or `None` when nothing has been fetched yet.
pub fn weather_panel(weather: Option<&CurrentWeather>) -> Option<String> {
    let weather = weather?;
    let title = weather.city().label();

    Some(format!(
        "{title}\n  {}\n  {}",
        weather.description,
        format_celsius(weather.temp_kelvin)
    ))
}

pub fn forecast_panel(forecast: Option<&[ForecastEntry]>) -> Option<String> {
    let forecast = forecast?;

    let mut out = String::from("Forecast");
    for (index, entry) in forecast.iter().enumerate() {
        out.push_str(&format!(
            "\n  Day {}: {}, {}",
            index + 1,
            format_celsius(entry.temp_kelvin),
            entry.description
        ));
        if let Some(at) = entry.at {
            out.push_str(&format!(" ({})", at.format("%a %d %b %H:%M UTC")));
        }
    }
    Some(out)
}

pub fn favorites_panel(favorites: &Favorites) -> String {
    render_favorites(favorites, City::label)
}

/// Favorites panel with each city's id in front, as `favorites remove` takes it.
pub fn favorites_panel_with_ids(favorites: &Favorites) -> String {
    render_favorites(favorites, city_row)
}

fn render_favorites(favorites: &Favorites, line: impl Fn(&City) -> String) -> String {
    if favorites.is_empty() {
        return "Favorites\n  No favorites yet.".to_string();
    }

    let mut out = String::from("Favorites");
    for city in favorites.iter() {
        out.push_str(&format!("\n  {}", line(city)));
    }
    out
}

/// `id  Name, CC` with the id right-aligned.
pub fn city_row(city: &City) -> String {
    format!("{:>10}  {}", city.id, city.label())
}

/// Home view: search, forecast, then current conditions.
pub fn home_view(state: &AppState) -> String {
    let mut sections = vec![nav_bar(View::Home), search_panel(state)];
    sections.extend(forecast_panel(state.forecast.as_deref()));
    sections.extend(weather_panel(state.weather.as_ref()));
    sections.join("\n\n")
}

pub fn favorites_view(state: &AppState) -> String {
    [nav_bar(View::Favorites), favorites_panel(&state.favorites)].join("\n\n")
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeAction {
    /// Focus the city input (runs the city lookup) and edit the text.
    EditCity,
    SearchWeather,
    SelectMatch(City),
    AddToFavorites(City),
    OpenFavorites,
    Quit,
}

impl fmt::Display for HomeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomeAction::EditCity => f.write_str("Type a city"),
            HomeAction::SearchWeather => f.write_str("Search"),
            HomeAction::SelectMatch(city) => write!(f, "Use {}", city.label()),
            HomeAction::AddToFavorites(city) => write!(f, "Add {} to favorites", city.name),
            HomeAction::OpenFavorites => f.write_str("Go to favorites"),
            HomeAction::Quit => f.write_str("Quit"),
        }
    }
}

pub fn home_actions(state: &AppState) -> Vec<HomeAction> {
    let mut actions = vec![HomeAction::EditCity, HomeAction::SearchWeather];

    actions.extend(state.matching_cities.iter().cloned().map(HomeAction::SelectMatch));

    if let Some(weather) = &state.weather {
        actions.push(HomeAction::AddToFavorites(weather.city()));
    }

    actions.push(HomeAction::OpenFavorites);
    actions.push(HomeAction::Quit);
    actions
}

#[derive(Debug, Clone, PartialEq)]
pub enum FavoritesAction {
    Remove(City),
    GoHome,
    Quit,
}

impl fmt::Display for FavoritesAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavoritesAction::Remove(city) => write!(f, "Remove {}", city.label()),
            FavoritesAction::GoHome => f.write_str("Back to home"),
            FavoritesAction::Quit => f.write_str("Quit"),
        }
    }
}

/// One remove action per favorite, in list order.
pub fn favorites_actions(state: &AppState) -> Vec<FavoritesAction> {
    let mut actions: Vec<_> =
        state.favorites.iter().cloned().map(FavoritesAction::Remove).collect();
    actions.push(FavoritesAction::GoHome);
    actions.push(FavoritesAction::Quit);
    actions
}
