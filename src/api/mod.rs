use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::cache::CachedFetcher;
use crate::store::Record;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/pokemon";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} {reason} from {url}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// One-shot JSON transport. Implemented over HTTP for the real data source
/// and by in-memory fakes in tests.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self, reqwest::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "critterdex/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let body = resp.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ListingPage {
    pub results: Vec<RecordSummary>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RecordSummary {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Detail document as it arrives off the wire. Categories are nested under
/// `types[].type.name`; [`Record`] flattens them.
#[derive(Clone, Debug, Deserialize)]
pub struct DetailDocument {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<CategorySlot>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub weight: Option<u32>,
    #[serde(default)]
    pub base_experience: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategorySlot {
    #[serde(rename = "type")]
    pub category: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

/// A record collection endpoint bound to a memoizing fetcher. All listing and
/// detail requests go through the cache, so a URL is fetched at most once per
/// session.
pub struct CatalogClient<F: Fetch> {
    base_url: String,
    fetcher: CachedFetcher<F>,
}

impl<F: Fetch> CatalogClient<F> {
    pub fn new(base_url: impl Into<String>, transport: F) -> Self {
        let mut base_url = base_url.into().trim().to_string();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            fetcher: CachedFetcher::new(transport),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &CachedFetcher<F> {
        &self.fetcher
    }

    pub fn listing_url(&self, limit: u32, offset: u32) -> String {
        format!("{}?limit={}&offset={}", self.base_url, limit, offset)
    }

    /// Identifiers are lower-cased before the request; the upstream lookup is
    /// case-insensitive but the URL space is all lowercase.
    pub fn detail_url(&self, identifier: &str) -> String {
        format!("{}/{}", self.base_url, identifier.trim().to_lowercase())
    }

    pub async fn listing(&self, limit: u32, offset: u32) -> Result<ListingPage, FetchError> {
        let url = self.listing_url(limit, offset);
        self.fetcher.fetch_cached_as(&url).await
    }

    pub async fn detail(&self, identifier: &str) -> Result<Record, FetchError> {
        let url = self.detail_url(identifier);
        let doc: DetailDocument = self.fetcher.fetch_cached_as(&url).await?;
        Ok(Record::from(doc))
    }
}
