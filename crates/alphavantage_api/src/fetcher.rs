use std::time::Duration;

use quote_model::{HistoricalSeries, Quote};
use result_cache::{ResultCache, get_or_compute};

use crate::api::{DataKind, FetchError, QuoteProvider};

/// Lifetime of a cached fetch result.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Builds the cache key for one operation on one symbol. The operation
/// segment keeps quote and historical entries for the same symbol apart.
pub fn cache_key(kind: DataKind, symbol: &str) -> String {
    format!("{}:{}", kind.as_str(), symbol)
}

/// Fetches quote data through the cache.
///
/// Cached values are served until expiry; fresh values come from the
/// provider and are memoized only on success, so an error is recomputed on
/// the next request.
pub struct QuoteFetcher<P, C> {
    provider: P,
    cache: C,
    ttl: Duration,
}

impl<P, C> QuoteFetcher<P, C>
where
    P: QuoteProvider,
    C: ResultCache,
{
    pub fn new(provider: P, cache: C) -> Self {
        Self::with_ttl(provider, cache, CACHE_TTL)
    }

    pub fn with_ttl(provider: P, cache: C, ttl: Duration) -> Self {
        QuoteFetcher {
            provider,
            cache,
            ttl,
        }
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let key = cache_key(DataKind::CurrentQuote, symbol);
        get_or_compute(&self.cache, &key, self.ttl, || {
            self.provider.global_quote(symbol)
        })
        .await
    }

    pub async fn historical(&self, symbol: &str) -> Result<HistoricalSeries, FetchError> {
        let key = cache_key(DataKind::HistoricalDaily, symbol);
        get_or_compute(&self.cache, &key, self.ttl, || {
            self.provider.daily_series(symbol)
        })
        .await
    }
}
