//! Interactive loop: renders the current view, asks for one action and
//! forwards it to the shell.

use std::fmt::Display;

use anyhow::Result;
use inquire::{InquireError, Select, Text};
use meteo_core::{Shell, View};
use tracing::debug;

use crate::panels::{self, FavoritesAction, HomeAction};

pub async fn run(shell: &mut Shell) -> Result<()> {
    loop {
        let keep_going = match shell.state().view {
            View::Home => home(shell).await?,
            View::Favorites => favorites(shell)?,
        };

        if !keep_going {
            return Ok(());
        }
    }
}

async fn home(shell: &mut Shell) -> Result<bool> {
    println!("\n{}\n", panels::home_view(shell.state()));

    let Some(action) = choose(panels::home_actions(shell.state()))? else {
        return Ok(false);
    };
    debug!(?action, "home action");

    match action {
        HomeAction::EditCity => {
            focus_city_input(shell, |current| {
                cancelled_as_none(Text::new("City:").with_initial_value(current).prompt())
            })
            .await?
        }
        HomeAction::SearchWeather => shell.search_weather().await,
        HomeAction::SelectMatch(city) => shell.handle_city_select(&city),
        HomeAction::AddToFavorites(city) => {
            shell.handle_add_to_favorites(&city);
        }
        HomeAction::OpenFavorites => shell.navigate(View::Favorites),
        HomeAction::Quit => return Ok(false),
    }

    Ok(true)
}

/// Focusing the input looks up cities for the text typed so far, then
/// `prompt` edits that text. `None` from the prompt keeps it unchanged.
async fn focus_city_input<F>(shell: &mut Shell, prompt: F) -> Result<()>
where
    F: FnOnce(&str) -> Result<Option<String>>,
{
    shell.handle_city_search().await;
    if !shell.state().matching_cities.is_empty() {
        println!("{}", panels::search_panel(shell.state()));
    }

    if let Some(text) = prompt(&shell.state().city)? {
        shell.set_city(text);
    }
    Ok(())
}

fn favorites(shell: &mut Shell) -> Result<bool> {
    println!("\n{}\n", panels::favorites_view(shell.state()));

    let Some(action) = choose(panels::favorites_actions(shell.state()))? else {
        // Esc leaves the favorites view rather than the app.
        shell.navigate(View::Home);
        return Ok(true);
    };
    debug!(?action, "favorites action");

    match action {
        FavoritesAction::Remove(city) => {
            shell.handle_remove_from_favorites(&city);
        }
        FavoritesAction::GoHome => shell.navigate(View::Home),
        FavoritesAction::Quit => return Ok(false),
    }

    Ok(true)
}

fn choose<T: Display>(options: Vec<T>) -> Result<Option<T>> {
    cancelled_as_none(Select::new("What next?", options).prompt())
}

/// Esc / Ctrl-C on a prompt is a choice, not an error.
fn cancelled_as_none<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meteo_core::{
        City, CurrentWeather, FavoritesStore, ForecastEntry, WeatherError, WeatherProvider,
    };
    use std::sync::{Arc, Mutex};

    /// Answers every city lookup with Rome and records the lookups.
    #[derive(Debug, Default)]
    struct CityLookup {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl WeatherProvider for CityLookup {
        async fn fetch_current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
            Err(WeatherError::NotFound(city.to_string()))
        }

        async fn fetch_forecast(
            &self,
            city: &str,
            _count: usize,
        ) -> Result<Vec<ForecastEntry>, WeatherError> {
            Err(WeatherError::NotFound(city.to_string()))
        }

        async fn search_cities(&self, partial: &str) -> Result<Vec<City>, WeatherError> {
            self.calls.lock().unwrap().push(format!("find:{partial}"));
            Ok(vec![City {
                id: 3169070,
                name: "Rome".into(),
                country: "IT".into(),
                coord: None,
            }])
        }
    }

    fn shell_with(provider: CityLookup) -> Shell {
        Shell::new(Box::new(provider), FavoritesStore::in_memory(), 7)
    }

    #[tokio::test]
    async fn focusing_city_input_looks_up_cities_before_prompting() {
        let provider = CityLookup::default();
        let calls = provider.calls.clone();
        let mut shell = shell_with(provider);
        shell.set_city("Ro");

        focus_city_input(&mut shell, |current| {
            assert_eq!(current, "Ro");
            assert_eq!(*calls.lock().unwrap(), vec!["find:Ro"]);
            Ok(Some("Rome".into()))
        })
        .await
        .unwrap();

        assert_eq!(shell.state().city, "Rome");
        assert_eq!(shell.state().matching_cities.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_city_prompt_keeps_pending_text() {
        let mut shell = shell_with(CityLookup::default());
        shell.set_city("Ro");

        focus_city_input(&mut shell, |_| Ok(None)).await.unwrap();

        assert_eq!(shell.state().city, "Ro");
    }

    #[test]
    fn cancelled_prompts_are_not_errors() {
        let answer: Result<String, InquireError> = Err(InquireError::OperationCanceled);
        assert!(cancelled_as_none(answer).unwrap().is_none());

        let answer: Result<String, InquireError> = Err(InquireError::OperationInterrupted);
        assert!(cancelled_as_none(answer).unwrap().is_none());
    }

    #[test]
    fn other_prompt_failures_propagate() {
        let answer: Result<String, InquireError> = Err(InquireError::NotTTY);
        assert!(cancelled_as_none(answer).is_err());

        let answer: Result<String, InquireError> = Ok("Rome".into());
        assert_eq!(cancelled_as_none(answer).unwrap().as_deref(), Some("Rome"));
    }
}
