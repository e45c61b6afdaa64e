use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::api::{Fetch, FetchError};

/// Per-URL memoization of decoded responses. Entries never expire or get
/// evicted within a session; this is a memoization table, not an LRU cache.
/// Failed fetches are not recorded, so the next call retries the transport.
pub struct CachedFetcher<F: Fetch> {
    inner: F,
    entries: Mutex<HashMap<String, Value>>,
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn fetch_cached(&self, url: &str) -> Result<Value, FetchError> {
        if let Some(value) = self.entries.lock().await.get(url) {
            return Ok(value.clone());
        }

        let value = self.inner.fetch_json(url).await?;
        self.entries
            .lock()
            .await
            .insert(url.to_string(), value.clone());
        Ok(value)
    }

    pub async fn fetch_cached_as<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let value = self.fetch_cached(url).await?;
        serde_json::from_value(value).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
