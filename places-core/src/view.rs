//! State behind the places page: filter, selection, map viewport and weather chart.

use std::{fmt, sync::Arc};

use crate::{
    coords::Coordinates,
    error::PlacesError,
    model::{Place, PlaceType, WeatherSample},
    places::PlaceFetcher,
    weather::{WeatherFetcher, WeatherKey},
};

pub const DEFAULT_CENTER: Coordinates = Coordinates {
    latitude: 51.505,
    longitude: -0.09,
};
pub const DEFAULT_ZOOM: u8 = 13;
/// Zoom used when flying to a selected place.
pub const SELECTED_ZOOM: u8 = 13;

pub const PLACES_ERROR: &str = "Error fetching places";
pub const WEATHER_ERROR: &str = "Error fetching weather data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceFilter {
    #[default]
    All,
    Type(PlaceType),
}

impl PlaceFilter {
    pub fn matches(&self, place: &Place) -> bool {
        match self {
            PlaceFilter::All => true,
            PlaceFilter::Type(kind) => place.kind == kind.as_str(),
        }
    }

    /// The filter choices in menu order.
    pub fn choices() -> Vec<PlaceFilter> {
        std::iter::once(PlaceFilter::All)
            .chain(PlaceType::all().iter().copied().map(PlaceFilter::Type))
            .collect()
    }
}

impl fmt::Display for PlaceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceFilter::All => f.write_str("All"),
            PlaceFilter::Type(kind) => f.write_str(kind.as_str()),
        }
    }
}

impl TryFrom<&str> for PlaceFilter {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(PlaceFilter::All);
        }
        PlaceType::try_from(value).map(PlaceFilter::Type)
    }
}

/// Places matching `filter`, in their original order.
pub fn filter_places<'a>(places: &'a [Place], filter: &PlaceFilter) -> Vec<&'a Place> {
    places.iter().filter(|p| filter.matches(p)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub place_id: i64,
    pub position: Coordinates,
    pub popup: String,
}

impl From<&Place> for Marker {
    fn from(place: &Place) -> Self {
        Self {
            place_id: place.id,
            position: place.coordinates(),
            popup: format!("{}\n{}", place.name, place.address),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: &'static str,
    pub unit: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherChart {
    pub title: String,
    pub labels: Vec<&'static str>,
    pub series: Vec<ChartSeries>,
}

impl WeatherChart {
    pub fn new(place_name: &str, sample: &WeatherSample) -> Self {
        Self {
            title: format!("Weather Data for {place_name}"),
            labels: vec!["Now"],
            series: vec![
                ChartSeries {
                    label: "Temperature",
                    unit: "°C",
                    values: vec![sample.temperature_celsius()],
                },
                ChartSeries {
                    label: "Pressure",
                    unit: "hPa",
                    values: vec![sample.pressure()],
                },
            ],
        }
    }
}

/// Filter, selection and viewport. Holds no fetched data of its own besides the weather
/// that arrived for the current selection.
#[derive(Debug, Clone, Default)]
pub struct PlacesView {
    filter: PlaceFilter,
    selected: Option<Place>,
    viewport: Viewport,
    weather: Option<(WeatherKey, Arc<WeatherSample>)>,
    weather_failed: Option<WeatherKey>,
}

impl PlacesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> PlaceFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: PlaceFilter) {
        self.filter = filter;
    }

    pub fn visible<'a>(&self, places: &'a [Place]) -> Vec<&'a Place> {
        filter_places(places, &self.filter)
    }

    pub fn markers(&self, places: &[Place]) -> Vec<Marker> {
        self.visible(places).into_iter().map(Marker::from).collect()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected(&self) -> Option<&Place> {
        self.selected.as_ref()
    }

    /// Select a place: fly the map to it and return the weather key to load.
    pub fn select(&mut self, place: Place) -> WeatherKey {
        let key = WeatherKey::for_place(&place);
        self.viewport = Viewport {
            center: place.coordinates(),
            zoom: SELECTED_ZOOM,
        };
        self.selected = Some(place);
        self.weather_failed = None;
        key
    }

    pub fn weather_key(&self) -> Option<WeatherKey> {
        self.selected.as_ref().map(WeatherKey::for_place)
    }

    /// Record weather that arrived for `key`. Ignored unless `key` is still selected.
    pub fn receive_weather(&mut self, key: WeatherKey, sample: Arc<WeatherSample>) -> bool {
        if self.weather_key() != Some(key) {
            tracing::debug!(?key, "dropping weather for a place no longer selected");
            return false;
        }
        self.weather = Some((key, sample));
        true
    }

    /// Record that loading weather for `key` failed. Ignored unless `key` is still selected.
    pub fn fail_weather(&mut self, key: WeatherKey) -> bool {
        if self.weather_key() != Some(key) {
            return false;
        }
        self.weather_failed = Some(key);
        true
    }

    /// Whether the weather for the current selection failed to load.
    pub fn has_weather_error(&self) -> bool {
        self.weather_failed.is_some() && self.weather_failed == self.weather_key()
    }

    /// The chart, once a place is selected and its weather has arrived.
    pub fn chart(&self) -> Option<WeatherChart> {
        let place = self.selected.as_ref()?;
        let (key, sample) = self.weather.as_ref()?;
        (*key == WeatherKey::for_place(place)).then(|| WeatherChart::new(&place.name, sample))
    }
}

/// What the places page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Error(&'static str),
    Ready {
        viewport: Viewport,
        markers: Vec<Marker>,
        chart: Option<WeatherChart>,
    },
}

/// The places page wired to its fetchers.
#[derive(Debug, Clone)]
pub struct PlacesPage {
    places: PlaceFetcher,
    weather: WeatherFetcher,
    view: PlacesView,
    list: Arc<Vec<Place>>,
    places_failed: bool,
}

impl PlacesPage {
    pub fn new(places: PlaceFetcher, weather: WeatherFetcher) -> Self {
        Self {
            places,
            weather,
            view: PlacesView::new(),
            list: Arc::default(),
            places_failed: false,
        }
    }

    pub fn view(&self) -> &PlacesView {
        &self.view
    }

    pub fn places(&self) -> &[Place] {
        &self.list
    }

    pub fn set_filter(&mut self, filter: PlaceFilter) {
        self.view.set_filter(filter);
    }

    /// Load (or reuse) the place list.
    pub async fn load(&mut self) -> Result<(), PlacesError> {
        match self.places.places().await {
            Ok(list) => {
                self.list = list;
                self.places_failed = false;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "failed to fetch places");
                self.places_failed = true;
                Err(err)
            }
        }
    }

    /// Select the visible place with `id` and load its weather.
    /// Returns `Ok(false)` when no marker has that id.
    pub async fn select(&mut self, id: i64) -> Result<bool, PlacesError> {
        let Some(place) = self
            .view
            .visible(&self.list)
            .into_iter()
            .find(|p| p.id == id)
            .cloned()
        else {
            return Ok(false);
        };

        let key = self.view.select(place);
        match self.weather.at(key).await {
            Ok(sample) => {
                self.view.receive_weather(key, sample);
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(%err, "failed to fetch weather");
                self.view.fail_weather(key);
                Err(err)
            }
        }
    }

    pub fn state(&self) -> PageState {
        if self.places_failed {
            return PageState::Error(PLACES_ERROR);
        }
        if self.view.has_weather_error() {
            return PageState::Error(WEATHER_ERROR);
        }
        PageState::Ready {
            viewport: self.view.viewport(),
            markers: self.view.markers(&self.list),
            chart: self.view.chart(),
        }
    }
}
