//! Alpha Vantage quote fetching: the HTTP client with response validation,
//! and the caching fetcher composed from a provider and a result cache.

pub mod api;
pub mod fetcher;
