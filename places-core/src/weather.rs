//! Weather lookups for the selected place.

use std::sync::Arc;

use crate::{
    api::PlacesApi,
    cache::{CachePolicy, Clock, QueryCache, SystemClock},
    coords::Coordinates,
    error::PlacesError,
    model::{Place, WeatherSample},
};

/// Cache key for a weather lookup.
///
/// Compares coordinates bit for bit so `NaN` pairs still key consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeatherKey {
    latitude: u64,
    longitude: u64,
}

impl WeatherKey {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.to_bits(),
            longitude: longitude.to_bits(),
        }
    }

    pub fn for_place(place: &Place) -> Self {
        Self::new(place.latitude, place.longitude)
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: f64::from_bits(self.latitude),
            longitude: f64::from_bits(self.longitude),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    api: Arc<dyn PlacesApi>,
    cache: Arc<QueryCache<WeatherKey, WeatherSample>>,
}

impl WeatherFetcher {
    pub fn new(api: Arc<dyn PlacesApi>, policy: CachePolicy) -> Self {
        Self::with_clock(api, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(api: Arc<dyn PlacesApi>, policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            cache: Arc::new(QueryCache::with_clock(policy, clock)),
        }
    }

    /// Weather for the selection, or `None` without any request when nothing is selected.
    pub async fn for_selection(
        &self,
        selected: Option<&Place>,
    ) -> Result<Option<(WeatherKey, Arc<WeatherSample>)>, PlacesError> {
        let Some(place) = selected else {
            return Ok(None);
        };

        let key = WeatherKey::for_place(place);
        let sample = self.at(key).await?;
        Ok(Some((key, sample)))
    }

    pub async fn at(&self, key: WeatherKey) -> Result<Arc<WeatherSample>, PlacesError> {
        let api = Arc::clone(&self.api);
        let Coordinates {
            latitude,
            longitude,
        } = key.coordinates();

        self.cache
            .fetch(key, move || async move {
                api.current_weather(latitude, longitude).await
            })
            .await
    }
}
