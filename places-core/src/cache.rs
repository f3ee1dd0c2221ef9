//! Keyed cache of asynchronous read results.
//!
//! Each key holds the last successful value with the time it was fetched, plus at most one
//! in-flight request. Callers asking for the same key while a request is outstanding join
//! it instead of issuing another. Once a value turns stale it is still served, while a
//! single background refresh replaces it (stale-while-revalidate). Failures are handed to
//! every joined caller and never stored.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::error::PlacesError;

/// Source of "now" for freshness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a value is served without triggering a refresh.
    pub stale_after: Duration,
    /// How long an unused value is kept at all.
    pub evict_after: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::ZERO,
            evict_after: Duration::from_secs(300),
        }
    }
}

/// What a cache read produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served from cache, still fresh.
    Fresh,
    /// Served from cache while a refresh runs in the background.
    Stale,
    /// Waited for a request (new or joined).
    Fetched,
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<Arc<V>, PlacesError>>>;

struct Cached<V> {
    value: Arc<V>,
    fetched_at: DateTime<Utc>,
}

struct Entry<V> {
    data: Option<Cached<V>>,
    inflight: Option<SharedFetch<V>>,
    generation: u64,
    last_used: DateTime<Utc>,
}

type Entries<K, V> = Arc<Mutex<HashMap<K, Entry<V>>>>;

enum Plan<V> {
    Ready(Arc<V>, Freshness),
    Revalidate(Arc<V>, SharedFetch<V>),
    Wait(SharedFetch<V>),
}

pub struct QueryCache<K, V> {
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
    entries: Entries<K, V>,
    next_generation: AtomicU64,
}

impl<K, V> fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.policy)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            policy,
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Read `key`, calling `fetcher` only when no usable value or request exists.
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> Result<Arc<V>, PlacesError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, PlacesError>> + Send + 'static,
    {
        self.fetch_with_status(key, fetcher).await.map(|(v, _)| v)
    }

    pub async fn fetch_with_status<F, Fut>(
        &self,
        key: K,
        fetcher: F,
    ) -> Result<(Arc<V>, Freshness), PlacesError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, PlacesError>> + Send + 'static,
    {
        let now = self.clock.now();

        let plan = {
            let mut entries = self.entries.lock();
            self.evict_unused(&mut entries, now);

            let entry = entries.entry(key.clone()).or_insert_with(|| Entry {
                data: None,
                inflight: None,
                generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
                last_used: now,
            });
            entry.last_used = now;

            let cached = entry
                .data
                .as_ref()
                .map(|c| (Arc::clone(&c.value), self.is_fresh(c, now)));

            match (cached, entry.inflight.clone()) {
                (Some((value, true)), _) => {
                    tracing::debug!(?key, "cache hit");
                    Plan::Ready(value, Freshness::Fresh)
                }
                (Some((value, false)), Some(_)) => Plan::Ready(value, Freshness::Stale),
                (Some((value, false)), None) => {
                    tracing::debug!(?key, "stale, revalidating in background");
                    Plan::Revalidate(value, self.start(key, entry, fetcher()))
                }
                (None, Some(inflight)) => {
                    tracing::debug!(?key, "joining in-flight request");
                    Plan::Wait(inflight)
                }
                (None, None) => {
                    tracing::debug!(?key, "cache miss");
                    Plan::Wait(self.start(key, entry, fetcher()))
                }
            }
        };

        match plan {
            Plan::Ready(value, freshness) => Ok((value, freshness)),
            Plan::Revalidate(value, refresh) => {
                tokio::spawn(refresh.map(|_| ()));
                Ok((value, Freshness::Stale))
            }
            Plan::Wait(pending) => pending.await.map(|v| (v, Freshness::Fetched)),
        }
    }

    /// Wrap `request` so its outcome lands in the entry it was started for.
    fn start<Fut>(&self, key: K, entry: &mut Entry<V>, request: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V, PlacesError>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let clock = Arc::clone(&self.clock);
        let generation = entry.generation;

        let shared = async move {
            let result = request.await.map(Arc::new);

            let mut entries = entries.lock();
            match entries.get_mut(&key) {
                Some(entry) if entry.generation == generation => {
                    entry.inflight = None;
                    match &result {
                        Ok(value) => {
                            entry.data = Some(Cached {
                                value: Arc::clone(value),
                                fetched_at: clock.now(),
                            });
                        }
                        Err(err) => tracing::debug!(?key, %err, "request failed"),
                    }
                }
                _ => tracing::debug!(?key, "discarding response for invalidated entry"),
            }

            result
        }
        .boxed()
        .shared();

        entry.inflight = Some(shared.clone());
        shared
    }

    /// Wait for the outstanding request on `key`, if any.
    pub async fn settled(&self, key: &K) {
        let inflight = self
            .entries
            .lock()
            .get(key)
            .and_then(|e| e.inflight.clone());

        if let Some(inflight) = inflight {
            let _ = inflight.await;
        }
    }

    /// The cached value for `key`, fresh or not, without fetching.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.entries
            .lock()
            .get(key)
            .and_then(|e| e.data.as_ref())
            .map(|c| Arc::clone(&c.value))
    }

    pub fn is_fetching(&self, key: &K) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|e| e.inflight.is_some())
    }

    /// Drop `key`. A request still running for it will not write back.
    pub fn invalidate(&self, key: &K) {
        if self.entries.lock().remove(key).is_some() {
            tracing::debug!(?key, "invalidated");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, cached: &Cached<V>, now: DateTime<Utc>) -> bool {
        elapsed(cached.fetched_at, now) < self.policy.stale_after
    }

    fn evict_unused(&self, entries: &mut HashMap<K, Entry<V>>, now: DateTime<Utc>) {
        let evict_after = self.policy.evict_after;
        entries.retain(|key, entry| {
            let keep = entry.inflight.is_some() || elapsed(entry.last_used, now) < evict_after;
            if !keep {
                tracing::debug!(?key, "evicting unused entry");
            }
            keep
        });
    }
}

fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or(Duration::ZERO)
}
