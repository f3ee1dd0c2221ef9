//! In-memory backend for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    api::PlacesApi,
    error::PlacesError,
    model::{Place, PlacePayload, PlaceRecord, WeatherMain, WeatherSample},
};

pub(crate) fn record(id: i64, name: &str, kind: &str, address: &str) -> PlaceRecord {
    PlaceRecord {
        id,
        name: name.to_string(),
        kind: kind.to_string(),
        address: address.to_string(),
    }
}

pub(crate) fn place(id: i64, name: &str, kind: &str, address: &str) -> Place {
    Place::from(record(id, name, kind, address))
}

#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    places: Mutex<Vec<PlaceRecord>>,
    created: Mutex<Vec<PlacePayload>>,
    weather_calls: Mutex<Vec<(f64, f64)>>,
    list_calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeApi {
    pub(crate) fn with_places(places: &[(i64, &str, &str, &str)]) -> Arc<Self> {
        let api = Self::default();
        *api.places.lock() = places
            .iter()
            .map(|(id, name, kind, address)| record(*id, name, kind, address))
            .collect();
        Arc::new(api)
    }

    /// Every endpoint answers 500.
    pub(crate) fn failing() -> Arc<Self> {
        let api = Self::default();
        api.set_failing(true);
        Arc::new(api)
    }

    pub(crate) fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn push_place(&self, id: i64, name: &str, kind: &str, address: &str) {
        self.places.lock().push(record(id, name, kind, address));
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn weather_calls(&self) -> Vec<(f64, f64)> {
        self.weather_calls.lock().clone()
    }

    pub(crate) fn created(&self) -> Vec<PlacePayload> {
        self.created.lock().clone()
    }

    fn check(&self) -> Result<(), PlacesError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlacesError::Status {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlacesApi for FakeApi {
    async fn list_places(&self) -> Result<Vec<PlaceRecord>, PlacesError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.check()?;
        Ok(self.places.lock().clone())
    }

    async fn create_place(&self, payload: &PlacePayload) -> Result<(), PlacesError> {
        self.check()?;
        self.created.lock().push(payload.clone());
        Ok(())
    }

    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSample, PlacesError> {
        self.weather_calls.lock().push((latitude, longitude));
        self.check()?;
        Ok(WeatherSample {
            main: WeatherMain {
                temp: 288.15,
                pressure: 1013.0,
            },
        })
    }
}
