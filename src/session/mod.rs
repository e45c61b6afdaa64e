use thiserror::Error;

use crate::api::{CatalogClient, Fetch, FetchError};
use crate::filter::{apply_filter, FilterCriteria};
use crate::pagination::{PageError, PageOutcome, PageState, Paginator};
use crate::render::Renderer;
use crate::store::{Record, RecordStore};

/// Derived state of the load-more affordance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMore {
    Ready,
    /// A page load is in flight; the affordance is disabled.
    Busy,
    /// The last load failed; enabled again with a retry indication.
    Retry,
    /// Filtered view or exhausted pagination; not shown at all.
    Hidden,
}

/// Pure function of session state; nothing here is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Affordances {
    pub load_more: LoadMore,
    pub show_reset: bool,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no record found for \"{identifier}\"")]
    NotFound { identifier: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The session context: owns the cached client, the store, the paginator,
/// the filter criteria and the renderer. One entry point per UI affordance;
/// every caught error becomes a renderer message and never clears
/// accumulated data.
pub struct Session<F: Fetch, R: Renderer> {
    client: CatalogClient<F>,
    store: RecordStore,
    paginator: Paginator,
    criteria: FilterCriteria,
    renderer: R,
    last_load_failed: bool,
}

impl<F: Fetch, R: Renderer> Session<F, R> {
    pub fn new(client: CatalogClient<F>, paginator: Paginator, renderer: R) -> Self {
        Self {
            client,
            store: RecordStore::new(),
            paginator,
            criteria: FilterCriteria::default(),
            renderer,
            last_load_failed: false,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn client(&self) -> &CatalogClient<F> {
        &self.client
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn affordances(&self) -> Affordances {
        let filtered = self.criteria.is_active();
        let load_more = if filtered {
            LoadMore::Hidden
        } else {
            match self.paginator.state() {
                PageState::Loading { .. } => LoadMore::Busy,
                PageState::Exhausted { .. } => LoadMore::Hidden,
                PageState::Idle { .. } if self.last_load_failed => LoadMore::Retry,
                PageState::Idle { .. } => LoadMore::Ready,
            }
        };
        Affordances {
            load_more,
            show_reset: filtered,
        }
    }

    pub async fn initial_load(&mut self) {
        self.load_more().await;
    }

    /// Loads the next page and re-renders the full store. Invalid while a
    /// filtered view is active.
    pub async fn load_more(&mut self) {
        if self.criteria.is_active() {
            self.renderer
                .render_error("clear the active filter before loading more records");
            return;
        }

        match self
            .paginator
            .load_next_page(&self.client, &mut self.store)
            .await
        {
            Ok(PageOutcome::Appended(_)) => {
                self.last_load_failed = false;
                self.renderer.render_list(self.store.records());
            }
            Ok(PageOutcome::AlreadyExhausted) => {}
            Err(PageError::InProgress) => {}
            Err(e) => {
                self.last_load_failed = true;
                self.renderer.render_error(&e.to_string());
            }
        }
    }

    /// Name search: filters the entire accumulated store, or falls back to a
    /// direct single-record lookup when nothing has been loaded yet. Never
    /// triggers pagination.
    pub async fn search(&mut self, term: &str) {
        let term = term.trim();
        self.criteria.name_substring = term.to_string();

        if !self.store.is_empty() {
            self.render_filtered();
            return;
        }

        if term.is_empty() {
            self.renderer.render_empty("no records loaded yet");
            return;
        }

        match self.lookup(term).await {
            Ok(record) => self.renderer.render_detail(&record),
            Err(LookupError::NotFound { identifier }) => self
                .renderer
                .render_empty(&format!("no record named \"{}\" was found", identifier)),
            Err(LookupError::Fetch(e)) => self.renderer.render_error(&e.to_string()),
        }
    }

    /// Category change: reconciles the filtered view against the whole store.
    pub fn set_category(&mut self, category: Option<String>) {
        self.criteria.category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if self.store.is_empty() {
            self.renderer.render_empty("no records loaded yet");
            return;
        }
        self.render_filtered();
    }

    /// On-demand detail view for a single record by id or name.
    pub async fn show_detail(&mut self, identifier: &str) {
        match self.lookup(identifier.trim()).await {
            Ok(record) => self.renderer.render_detail(&record),
            Err(LookupError::NotFound { identifier }) => self
                .renderer
                .render_empty(&format!("no record named \"{}\" was found", identifier)),
            Err(LookupError::Fetch(e)) => self.renderer.render_error(&e.to_string()),
        }
    }

    /// Back to the unfiltered initial view. The request cache stays warm, so
    /// reloading previously seen pages issues no new requests.
    pub async fn reset(&mut self) {
        self.paginator.reset(&mut self.store);
        self.criteria.clear();
        self.last_load_failed = false;
        self.load_more().await;
    }

    fn render_filtered(&mut self) {
        if !self.criteria.is_active() {
            self.renderer.render_list(self.store.records());
            return;
        }
        let matches = apply_filter(self.store.records(), &self.criteria);
        if matches.is_empty() {
            self.renderer.render_empty("no records match the filter");
        } else {
            self.renderer.render_list(&matches);
        }
    }

    async fn lookup(&self, identifier: &str) -> Result<Record, LookupError> {
        match self.client.detail(identifier).await {
            Ok(record) => Ok(record),
            Err(e) if e.is_not_found() => Err(LookupError::NotFound {
                identifier: identifier.to_string(),
            }),
            Err(e) => Err(LookupError::Fetch(e)),
        }
    }
}
