use futures::future;
use thiserror::Error;

use crate::api::{CatalogClient, Fetch, FetchError};
use crate::store::{Record, RecordStore};

/// Explicit load state. All affordance visibility is derived from this value
/// rather than from scattered presentation flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageState {
    Idle { offset: u32 },
    Loading { offset: u32 },
    /// No further pages will load; `offset` is how far the controller got,
    /// which can be short of the cap when the upstream ran out early.
    Exhausted { offset: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// A page was fetched and appended to the store.
    Appended(usize),
    /// The controller was already exhausted; nothing was fetched.
    AlreadyExhausted,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("a page load is already in flight")]
    InProgress,

    #[error("failed to fetch record listing: {0}")]
    Listing(#[source] FetchError),

    #[error("failed to fetch detail for \"{name}\": {source}")]
    Detail {
        name: String,
        #[source]
        source: FetchError,
    },
}

/// Offset/limit state machine driving incremental loads. Page loads are
/// all-or-nothing: any failed fetch rolls the state back to the prior offset
/// with the store untouched.
#[derive(Debug)]
pub struct Paginator {
    state: PageState,
    page_size: u32,
    total_cap: u32,
}

impl Paginator {
    pub fn new(page_size: u32, total_cap: u32) -> Self {
        Self {
            state: PageState::Idle { offset: 0 },
            page_size: page_size.max(1),
            total_cap,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn offset(&self) -> u32 {
        match self.state {
            PageState::Idle { offset }
            | PageState::Loading { offset }
            | PageState::Exhausted { offset } => offset,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_cap(&self) -> u32 {
        self.total_cap
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PageState::Loading { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, PageState::Exhausted { .. })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: PageState) {
        self.state = state;
    }

    /// Fetches the next page through the cache: one listing request, then one
    /// detail request per summary, concurrently. The combined result keeps
    /// listing order. Re-entrant calls while `Loading` are rejected.
    pub async fn load_next_page<F: Fetch>(
        &mut self,
        client: &CatalogClient<F>,
        store: &mut RecordStore,
    ) -> Result<PageOutcome, PageError> {
        let offset = match self.state {
            PageState::Loading { .. } => return Err(PageError::InProgress),
            PageState::Exhausted { .. } => return Ok(PageOutcome::AlreadyExhausted),
            PageState::Idle { offset } => offset,
        };

        // The last page is clamped so the store never exceeds the cap.
        let limit = self.page_size.min(self.total_cap.saturating_sub(offset));
        if limit == 0 {
            self.state = PageState::Exhausted { offset };
            return Ok(PageOutcome::AlreadyExhausted);
        }

        self.state = PageState::Loading { offset };
        match fetch_page(client, limit, offset).await {
            Ok(records) => {
                let appended = records.len();
                store.append_page(records);
                let next = offset + appended as u32;
                // A short listing means the upstream ran out before the cap.
                self.state = if next >= self.total_cap || (appended as u32) < limit {
                    PageState::Exhausted { offset: next }
                } else {
                    PageState::Idle { offset: next }
                };
                Ok(PageOutcome::Appended(appended))
            }
            Err(e) => {
                self.state = PageState::Idle { offset };
                Err(e)
            }
        }
    }

    /// Returns to the initial state and empties the store. The request cache
    /// is left warm; already-fetched pages are served without re-fetching.
    pub fn reset(&mut self, store: &mut RecordStore) {
        self.state = PageState::Idle { offset: 0 };
        store.clear();
    }
}

async fn fetch_page<F: Fetch>(
    client: &CatalogClient<F>,
    limit: u32,
    offset: u32,
) -> Result<Vec<Record>, PageError> {
    let listing = client
        .listing(limit, offset)
        .await
        .map_err(PageError::Listing)?;

    let fetches = listing.results.iter().map(|summary| {
        let name = summary.name.clone();
        async move {
            client
                .detail(&name)
                .await
                .map_err(|e| PageError::Detail { name, source: e })
        }
    });

    future::try_join_all(fetches).await
}
