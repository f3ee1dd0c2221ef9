//! Place list fetching.

use std::sync::Arc;

use crate::{
    api::PlacesApi,
    cache::{CachePolicy, Clock, QueryCache, SystemClock},
    error::PlacesError,
    model::Place,
};

pub const PLACES_KEY: &str = "places";

/// Reads `GET /place` through the shared cache and derives coordinates for every record.
#[derive(Debug, Clone)]
pub struct PlaceFetcher {
    api: Arc<dyn PlacesApi>,
    cache: Arc<QueryCache<&'static str, Vec<Place>>>,
}

impl PlaceFetcher {
    pub fn new(api: Arc<dyn PlacesApi>, policy: CachePolicy) -> Self {
        Self::with_clock(api, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(api: Arc<dyn PlacesApi>, policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            cache: Arc::new(QueryCache::with_clock(policy, clock)),
        }
    }

    pub async fn places(&self) -> Result<Arc<Vec<Place>>, PlacesError> {
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(PLACES_KEY, move || async move {
                let records = api.list_places().await?;
                tracing::debug!(count = records.len(), "fetched places");
                Ok::<_, PlacesError>(records.into_iter().map(Place::from).collect())
            })
            .await
    }

    /// Forget the cached list so the next read waits for the backend.
    pub fn invalidate(&self) {
        self.cache.invalidate(&PLACES_KEY);
    }

    /// Wait for any background refresh of the list to finish.
    pub async fn settled(&self) {
        self.cache.settled(&PLACES_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::FakeClock;
    use crate::testing::FakeApi;
    use std::time::Duration;

    fn policy(stale_after: u64) -> CachePolicy {
        CachePolicy {
            stale_after: Duration::from_secs(stale_after),
            evict_after: Duration::from_secs(300),
        }
    }

    #[tokio::test]
    async fn places_are_augmented_with_coordinates() {
        let api = FakeApi::with_places(&[
            (1, "Ritz", "Hotel", "51.507, -0.141"),
            (2, "Somewhere", "Park", "not coordinates"),
        ]);
        let fetcher = PlaceFetcher::new(api.clone(), policy(60));

        let places = fetcher.places().await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].latitude, 51.507);
        assert_eq!(places[0].longitude, -0.141);
        assert!(places[1].latitude.is_nan());
        assert!(places[1].longitude.is_nan());
    }

    #[tokio::test]
    async fn concurrent_reads_issue_one_request() {
        let api = FakeApi::with_places(&[(1, "Ritz", "Hotel", "51.507, -0.141")]);
        let fetcher = PlaceFetcher::new(api.clone(), policy(60));

        let (a, b) = tokio::join!(fetcher.places(), fetcher.places());

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn cached_list_is_reused_until_invalidated() {
        let clock = FakeClock::new();
        let api = FakeApi::with_places(&[(1, "Ritz", "Hotel", "51.507, -0.141")]);
        let fetcher = PlaceFetcher::with_clock(api.clone(), policy(60), clock.clone());

        fetcher.places().await.unwrap();
        clock.advance(Duration::from_secs(10));
        fetcher.places().await.unwrap();
        assert_eq!(api.list_calls(), 1);

        fetcher.invalidate();
        fetcher.places().await.unwrap();
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn stale_list_is_revalidated_in_background() {
        let clock = FakeClock::new();
        let api = FakeApi::with_places(&[(1, "Ritz", "Hotel", "51.507, -0.141")]);
        let fetcher = PlaceFetcher::with_clock(api.clone(), policy(0), clock.clone());

        fetcher.places().await.unwrap();
        api.push_place(2, "Dishoom", "Restaurant", "51.512, -0.127");

        let stale = fetcher.places().await.unwrap();
        assert_eq!(stale.len(), 1);

        fetcher.settled().await;
        assert_eq!(api.list_calls(), 2);
        clock.advance(Duration::from_secs(1));
        let refreshed = fetcher.places().await.unwrap();
        assert_eq!(refreshed.len(), 2);
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let api = FakeApi::failing();
        let fetcher = PlaceFetcher::new(api.clone(), policy(60));

        let err = fetcher.places().await.unwrap_err();
        assert!(matches!(err, PlacesError::Status { status: 500, .. }));
    }
}
