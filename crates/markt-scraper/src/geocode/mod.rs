//! Geocoding with an at-most-once-per-query cache.
//!
//! [`CachedGeocoder`] owns a [`GeocodeCache`] and a [`Geocoder`]
//! collaborator. Every distinct query reaches the collaborator at most once
//! per run; failed lookups are cached as `{None, None}` like successes.

mod nominatim;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use sha2::{Digest, Sha256};

use markt_core::{Coordinates, GeocodeResult};

use crate::error::ScraperError;
use crate::rate_limit::RequestPacer;

pub use nominatim::NominatimClient;

/// Free-text address lookup returning the single best match.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    /// Returns `Ok(None)` when the service has no match for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport failures or malformed responses.
    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, ScraperError>;
}

/// Stable cache key for a geocode query: SHA-256 of the exact string, hex-encoded.
#[must_use]
pub fn cache_key(query: &str) -> String {
    format!("{:x}", Sha256::digest(query.as_bytes()))
}

/// In-memory map from [`cache_key`] to the memoized lookup outcome.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: HashMap<String, GeocodeResult>,
}

impl GeocodeCache {
    #[must_use]
    pub fn get(&self, query: &str) -> Option<GeocodeResult> {
        self.entries.get(&cache_key(query)).copied()
    }

    /// Stores `result` for `query` unless an entry already exists. Returns
    /// `true` when the entry was written.
    pub fn insert(&mut self, query: &str, result: GeocodeResult) -> bool {
        match self.entries.entry(cache_key(query)) {
            Entry::Vacant(slot) => {
                slot.insert(result);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A [`Geocoder`] fronted by a [`GeocodeCache`] and a [`RequestPacer`].
pub struct CachedGeocoder<G> {
    geocoder: G,
    cache: GeocodeCache,
    pacer: RequestPacer,
    network_calls: usize,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// `min_interval` is the enforced gap between two network lookups.
    /// Cache hits never wait.
    #[must_use]
    pub fn new(geocoder: G, cache: GeocodeCache, min_interval: Duration) -> Self {
        Self {
            geocoder,
            cache,
            pacer: RequestPacer::new(min_interval),
            network_calls: 0,
        }
    }

    /// Resolves `query` to coordinates. Empty queries return a missing
    /// result without touching the cache or the network.
    pub async fn resolve(&mut self, query: &str) -> GeocodeResult {
        if query.trim().is_empty() {
            return GeocodeResult::missing();
        }
        if let Some(hit) = self.cache.get(query) {
            tracing::debug!(query, resolved = hit.is_resolved(), "geocode cache hit");
            return hit;
        }

        self.pacer.wait().await;
        self.network_calls += 1;
        let result = match self.geocoder.lookup(query).await {
            Ok(Some(coordinates)) => {
                tracing::debug!(
                    query,
                    lat = coordinates.lat,
                    lng = coordinates.lng,
                    "geocoded"
                );
                GeocodeResult::found(coordinates)
            }
            Ok(None) => {
                tracing::warn!(query, "no geocoding results");
                GeocodeResult::missing()
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "geocoding failed");
                GeocodeResult::missing()
            }
        };
        self.cache.insert(query, result);
        result
    }

    #[must_use]
    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Number of lookups that reached the collaborator.
    #[must_use]
    pub fn network_calls(&self) -> usize {
        self.network_calls
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    enum Reply {
        Found(Coordinates),
        Empty,
        Fail,
    }

    struct FakeGeocoder {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Geocoder for &FakeGeocoder {
        async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, ScraperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Found(c) => Ok(Some(c)),
                Reply::Empty => Ok(None),
                Reply::Fail => Err(ScraperError::MalformedGeocode {
                    query: query.to_owned(),
                    reason: "boom".to_owned(),
                }),
            }
        }
    }

    const AMSTERDAM: Coordinates = Coordinates {
        lat: 52.370_216,
        lng: 4.895_168,
    };

    fn cached(fake: &FakeGeocoder) -> CachedGeocoder<&FakeGeocoder> {
        CachedGeocoder::new(fake, GeocodeCache::default(), Duration::ZERO)
    }

    #[test]
    fn cache_key_is_stable_sha256_hex() {
        let key = cache_key("Dam 1, 1012 JS Amsterdam");
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key("Dam 1, 1012 JS Amsterdam"));
        assert_ne!(key, cache_key("Dam 1, 1012 JS  Amsterdam"));
    }

    #[test]
    fn cache_never_overwrites_an_entry() {
        let mut cache = GeocodeCache::default();
        assert!(cache.insert("q", GeocodeResult::missing()));
        assert!(!cache.insert("q", GeocodeResult::found(AMSTERDAM)));
        assert_eq!(cache.get("q"), Some(GeocodeResult::missing()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn empty_query_skips_cache_and_network() {
        let fake = FakeGeocoder::new(Reply::Found(AMSTERDAM));
        let mut geocoder = cached(&fake);
        assert_eq!(geocoder.resolve("").await, GeocodeResult::missing());
        assert_eq!(geocoder.resolve("   ").await, GeocodeResult::missing());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
        assert!(geocoder.cache().is_empty());
    }

    #[tokio::test]
    async fn repeated_query_hits_network_once() {
        let fake = FakeGeocoder::new(Reply::Found(AMSTERDAM));
        let mut geocoder = cached(&fake);
        let first = geocoder.resolve("Dam 1, 1012 JS Amsterdam").await;
        let second = geocoder.resolve("Dam 1, 1012 JS Amsterdam").await;
        assert_eq!(first, GeocodeResult::found(AMSTERDAM));
        assert_eq!(first, second);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert_eq!(geocoder.network_calls(), 1);
    }

    #[tokio::test]
    async fn empty_result_is_memoized() {
        let fake = FakeGeocoder::new(Reply::Empty);
        let mut geocoder = cached(&fake);
        assert_eq!(geocoder.resolve("Nergensweg 1").await, GeocodeResult::missing());
        assert_eq!(geocoder.resolve("Nergensweg 1").await, GeocodeResult::missing());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_lookup_is_memoized() {
        let fake = FakeGeocoder::new(Reply::Fail);
        let mut geocoder = cached(&fake);
        assert_eq!(geocoder.resolve("Kapotweg 2").await, GeocodeResult::missing());
        assert_eq!(geocoder.resolve("Kapotweg 2").await, GeocodeResult::missing());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert_eq!(geocoder.cache().get("Kapotweg 2"), Some(GeocodeResult::missing()));
    }

    #[tokio::test]
    async fn distinct_queries_each_reach_network() {
        let fake = FakeGeocoder::new(Reply::Found(AMSTERDAM));
        let mut geocoder = cached(&fake);
        geocoder.resolve("Dam 1, Amsterdam").await;
        geocoder.resolve("Coolsingel 40, Rotterdam").await;
        geocoder.resolve("Dam 1, Amsterdam").await;
        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
        assert_eq!(geocoder.cache().len(), 2);
    }
}
