//! Core library for the `places` client.
//!
//! This crate defines:
//! - Configuration of the backend connection
//! - The HTTP client for `/place` and `/weather`, behind the `PlacesApi` trait
//! - A keyed fetch cache shared by the place and weather fetchers
//! - Page state: the creation form, the places view and the routes
//!
//! It is used by `places-cli`, but holds no terminal code of its own.

pub mod api;
pub mod cache;
pub mod config;
pub mod coords;
pub mod error;
pub mod form;
pub mod model;
pub mod nav;
pub mod places;
pub mod view;
pub mod weather;

#[cfg(test)]
mod testing;

pub use api::{HttpPlacesApi, PlacesApi};
pub use cache::{CachePolicy, Clock, QueryCache, SystemClock};
pub use config::{ApiSettings, Config};
pub use coords::{Coordinates, extract_coordinates};
pub use error::PlacesError;
pub use form::{CreationForm, PLACE_FIELDS, PlaceField, SubmitOutcome};
pub use model::{Place, PlaceRecord, PlaceType, WeatherSample};
pub use nav::Route;
pub use places::PlaceFetcher;
pub use view::{PageState, PlaceFilter, PlacesPage, PlacesView};
pub use weather::{WeatherFetcher, WeatherKey};
