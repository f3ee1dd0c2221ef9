//! The three pages, plus the shell that navigates between them.

use std::fmt;

use anyhow::{Context, Result, bail};
use inquire::{Confirm, InquireError, Select, Text};
use places_core::{
    Config, CreationForm, PageState, Place, PlaceFilter, PlacesPage, Route, SubmitOutcome,
    form::{FieldKind, PlaceField},
    view::{PLACES_ERROR, WEATHER_ERROR},
};

use crate::{cli::Session, render};

/// `None` when the user backed out with Esc or Ctrl-C.
fn answered<T>(result: inquire::error::InquireResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub fn home() {
    println!("{}\n", render::nav_bar(Some(Route::Home)));
    println!("{}", Route::Home.heading());
}

pub async fn list(session: &Session, filter: PlaceFilter, select: Option<i64>) -> Result<()> {
    let mut page = session.places_page();
    page.set_filter(filter);

    println!("{}\n", render::nav_bar(Some(Route::Places)));
    println!("Filter by type: {filter}");

    page.load().await.context(PLACES_ERROR)?;
    if let Some(id) = select {
        if !page.select(id).await.context(WEATHER_ERROR)? {
            bail!("No place with id {id} matches filter '{filter}'");
        }
    }

    println!("{}", render::page_state(&page.state()));
    Ok(())
}

pub async fn create(session: &Session, prefilled: &[(&str, Option<String>)]) -> Result<()> {
    let mut form = CreationForm::default();
    for (name, value) in prefilled {
        if let Some(value) = value {
            form.prefill(name, value)?;
        }
    }

    println!("{}\n", render::nav_bar(Some(Route::Create)));
    if !run_form(session, &mut form).await? {
        bail!("No place was created");
    }
    Ok(())
}

pub fn configure(mut config: Config) -> Result<()> {
    let server = Text::new("Server URL")
        .with_initial_value(config.server_url.as_deref().unwrap_or("http://localhost:8080"))
        .prompt()?;
    let client = Text::new("Client URL")
        .with_help_message("Origin advertised in CORS headers; leave empty to skip")
        .with_initial_value(config.client_url.as_deref().unwrap_or_default())
        .prompt()?;

    config.server_url = Some(server.trim().to_string());
    config.client_url = Some(client.trim().to_string()).filter(|c| !c.is_empty());
    config.api_settings()?;
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum MenuChoice {
    Go(Route),
    Quit,
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Go(route) => write!(f, "{route}"),
            MenuChoice::Quit => f.write_str("Quit"),
        }
    }
}

pub async fn shell(config: &Config) -> Result<()> {
    // Built on first use so Home still works before `places configure`.
    let mut session: Option<Session> = None;
    let mut route = Route::Home;

    loop {
        println!("\n{}\n", render::nav_bar(Some(route)));

        match route {
            Route::Home => println!("{}", Route::Home.heading()),
            Route::Places | Route::Create => {
                if session.is_none() {
                    match Session::from_config(config) {
                        Ok(s) => session = Some(s),
                        Err(err) => eprintln!("{err:#}"),
                    }
                }
                if let Some(session) = &session {
                    if route == Route::Places {
                        browse(session).await?;
                    } else {
                        run_form(session, &mut CreationForm::default()).await?;
                    }
                }
            }
        }

        let choices: Vec<MenuChoice> = Route::all()
            .iter()
            .copied()
            .map(MenuChoice::Go)
            .chain([MenuChoice::Quit])
            .collect();

        match answered(Select::new("Go to", choices).prompt())? {
            Some(MenuChoice::Go(next)) => route = next,
            Some(MenuChoice::Quit) | None => return Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlacesAction {
    Filter,
    Select,
    Back,
}

impl fmt::Display for PlacesAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlacesAction::Filter => "Filter by type",
            PlacesAction::Select => "Show weather for a place",
            PlacesAction::Back => "Back",
        })
    }
}

struct PlaceChoice {
    id: i64,
    label: String,
}

impl From<&Place> for PlaceChoice {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id,
            label: format!("{} ({})", place.name, place.kind),
        }
    }
}

impl fmt::Display for PlaceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

async fn browse(session: &Session) -> Result<()> {
    let mut page: PlacesPage = session.places_page();
    // Failures land in the page state and are rendered below.
    let _ = page.load().await;

    loop {
        let state = page.state();
        println!("Filter by type: {}", page.view().filter());
        println!("{}", render::page_state(&state));
        if matches!(state, PageState::Error(_)) {
            return Ok(());
        }

        let actions = vec![PlacesAction::Filter, PlacesAction::Select, PlacesAction::Back];
        match answered(Select::new("Places", actions).prompt())? {
            Some(PlacesAction::Filter) => {
                let prompt = Select::new("Filter by type", PlaceFilter::choices());
                if let Some(filter) = answered(prompt.prompt())? {
                    page.set_filter(filter);
                }
            }
            Some(PlacesAction::Select) => {
                let visible: Vec<PlaceChoice> = page
                    .view()
                    .visible(page.places())
                    .into_iter()
                    .map(PlaceChoice::from)
                    .collect();
                if visible.is_empty() {
                    println!("No places to select.");
                    continue;
                }
                if let Some(choice) = answered(Select::new("Show weather for", visible).prompt())? {
                    let _ = page.select(choice.id).await;
                }
            }
            Some(PlacesAction::Back) | None => return Ok(()),
        }
    }
}

/// Prompt, validate and submit until the place is created or the user gives up.
/// Returns whether a place was created.
async fn run_form(session: &Session, form: &mut CreationForm) -> Result<bool> {
    println!("{}\n", Route::Create.heading());

    loop {
        for field in form.fields() {
            let needs_input = form.value(field.name).is_empty() || form.error(field.name).is_some();
            if needs_input && !prompt_field(form, field)? {
                return Ok(false);
            }
        }

        let outcome = form.submit(session.api.as_ref()).await;
        match &outcome {
            SubmitOutcome::Invalid => {
                println!("Please fix the following:\n{}", render::form_errors(form));
            }
            SubmitOutcome::Created => {
                println!("{}", outcome.notice().unwrap_or_default());
                session.places.invalidate();
                return Ok(true);
            }
            SubmitOutcome::Failed(err) => {
                eprintln!("{}: {}", outcome.notice().unwrap_or_default(), err.user_message());
                tracing::debug!(%err, "create failed");

                let retry = Confirm::new("Try again?").with_default(true).prompt();
                if answered(retry)? != Some(true) {
                    return Ok(false);
                }
            }
        }
    }
}

/// Ask for one field until the form accepts the answer. `false` if the user backed out.
fn prompt_field(form: &mut CreationForm, field: &PlaceField) -> Result<bool> {
    loop {
        let answer = match field.kind {
            FieldKind::Select => {
                answered(Select::new(field.label, field.options.to_vec()).prompt())?
                    .map(str::to_string)
            }
            FieldKind::Text => {
                let help = form.helper_text(field.name);
                let mut prompt = Text::new(field.label);
                if let Some(help) = help.as_deref() {
                    prompt = prompt.with_help_message(help);
                }
                answered(prompt.prompt())?
            }
        };

        let Some(answer) = answer else {
            return Ok(false);
        };
        match form.input(field.name, &answer) {
            Ok(()) => return Ok(true),
            Err(rejected) => eprintln!("{rejected}"),
        }
    }
}
