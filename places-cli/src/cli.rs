use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use places_core::{
    Config, HttpPlacesApi, PlaceFetcher, PlaceFilter, PlacesApi, PlacesPage, Route,
    WeatherFetcher,
};

use crate::pages;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "places", version, about = "Browse places on a map and create new ones")]
pub struct Cli {
    /// Without a subcommand, opens the interactive shell.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the home page.
    Home,

    /// List places, optionally filtered, and show weather for one of them.
    List {
        /// "all", or one of Restaurant, Hotel, Park.
        #[arg(long = "type", default_value = "all")]
        kind: String,

        /// Id of the place to select.
        #[arg(long)]
        select: Option<i64>,
    },

    /// Create a place. Missing values are prompted for.
    Create {
        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Open a page by path: "/", "/places" or "/create".
    Open { path: String },

    /// Configure the server and client URLs.
    Configure,
}

/// Everything a page needs to talk to the backend. Fetchers share their caches across
/// pages for the life of the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub api: Arc<dyn PlacesApi>,
    pub places: PlaceFetcher,
    pub weather: WeatherFetcher,
}

impl Session {
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = config.api_settings()?;
        let api: Arc<dyn PlacesApi> =
            Arc::new(HttpPlacesApi::new(&settings).context("Failed to build HTTP client")?);
        let policy = config.cache_policy();

        tracing::debug!(base_url = %settings.base_url, ?policy, "session ready");

        Ok(Self {
            places: PlaceFetcher::new(Arc::clone(&api), policy),
            weather: WeatherFetcher::new(Arc::clone(&api), policy),
            api,
        })
    }

    pub fn places_page(&self) -> PlacesPage {
        PlacesPage::new(self.places.clone(), self.weather.clone())
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = || -> Result<Config> { Ok(Config::load()?.with_env()) };

        match self.command {
            None => pages::shell(&config()?).await,
            Some(Command::Home) => {
                pages::home();
                Ok(())
            }
            Some(Command::List { kind, select }) => {
                let filter = PlaceFilter::try_from(kind.as_str())?;
                let session = Session::from_config(&config()?)?;
                pages::list(&session, filter, select).await
            }
            Some(Command::Create {
                name,
                kind,
                address,
            }) => {
                let session = Session::from_config(&config()?)?;
                let prefilled = [("name", name), ("type", kind), ("address", address)];
                pages::create(&session, &prefilled).await
            }
            Some(Command::Open { path }) => match Route::from_path(&path) {
                Some(Route::Home) => {
                    pages::home();
                    Ok(())
                }
                Some(Route::Places) => {
                    let session = Session::from_config(&config()?)?;
                    pages::list(&session, PlaceFilter::All, None).await
                }
                Some(Route::Create) => {
                    let session = Session::from_config(&config()?)?;
                    pages::create(&session, &[]).await
                }
                None => bail!("No page at '{path}'"),
            },
            // Saved without environment overrides so they don't leak into the file.
            Some(Command::Configure) => pages::configure(Config::load()?),
        }
    }
}
