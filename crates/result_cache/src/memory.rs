use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::ResultCache;

/// In-process cache with lazy expiry on read.
///
/// Backs tests, and works as a single-process stand-in for the Redis cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

struct Entry {
    payload: String,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn fetch(&self, key: &str) -> Option<String> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(_) => return None,
        };

        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.payload.clone())
    }

    async fn store(&self, key: &str, value: &str, ttl: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_string(),
                Entry {
                    payload: value.to_string(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }
}
