//! Paginated product listing with last-request-wins semantics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use storefront_client::{CatalogSource, ProductQuery};
use storefront_core::{PagedResult, Product};
use tokio::sync::watch;

use crate::error::ViewError;
use crate::LoadOutcome;

/// Published state of a [`ListingCoordinator`].
///
/// While a request is in flight, `loading` is set and `query` already names
/// the new request, but `items`, `total` and `total_pages` still describe the
/// last committed page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    pub query: Option<ProductQuery>,
    pub items: Vec<Product>,
    pub total: u64,
    pub total_pages: u64,
    pub loading: bool,
    pub error: Option<ViewError>,
}

impl ListingState {
    /// Current page number, or `1` before the first load.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.query.as_ref().map_or(1, |q| q.page)
    }
}

/// Owns one product listing and coordinates every request made for it.
///
/// Each load is tagged with a generation. A response is committed only if its
/// generation is still the latest one issued, so a slow response for an old
/// query can never overwrite the result of a newer one.
pub struct ListingCoordinator<S> {
    source: Arc<S>,
    timeout: Duration,
    generation: AtomicU64,
    state: watch::Sender<ListingState>,
}

impl<S: CatalogSource> ListingCoordinator<S> {
    #[must_use]
    pub fn new(source: Arc<S>, timeout: Duration) -> Self {
        let (state, _) = watch::channel(ListingState::default());
        Self {
            source,
            timeout,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Receiver that observes every committed state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ListingState {
        self.state.borrow().clone()
    }

    /// Switches to `query`, unless it is already the current query.
    pub async fn set_query(&self, query: ProductQuery) -> LoadOutcome {
        if self.state.borrow().query.as_ref() == Some(&query) {
            return LoadOutcome::Unchanged;
        }
        self.load(query).await
    }

    /// Re-issues the current query, e.g. after an error.
    pub async fn reload(&self) -> LoadOutcome {
        let query = self.state.borrow().query.clone();
        match query {
            Some(query) => self.load(query).await,
            None => LoadOutcome::NotReady,
        }
    }

    /// Issues `query` unconditionally.
    ///
    /// On failure the listing is cleared and the error recorded; it is never
    /// retried.
    pub async fn load(&self, query: ProductQuery) -> LoadOutcome {
        match self.run(query).await {
            Some(_) => LoadOutcome::Committed,
            None => LoadOutcome::Superseded,
        }
    }

    /// Loads `query` and returns what was committed, or `None` if a newer
    /// request superseded it.
    pub(crate) async fn run(
        &self,
        query: ProductQuery,
    ) -> Option<Result<PagedResult<Product>, ViewError>> {
        let generation = self.begin(&query);
        let result = self.fetch(&query).await;

        let committed = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            state.loading = false;
            match &result {
                Ok(page) => {
                    state.items.clone_from(&page.items);
                    state.total = page.total;
                    state.total_pages = page.total_pages;
                    state.error = None;
                }
                Err(error) => {
                    state.items.clear();
                    state.total = 0;
                    state.total_pages = 0;
                    state.error = Some(error.clone());
                }
            }
            true
        });

        if committed {
            Some(result)
        } else {
            tracing::debug!(
                generation,
                page = query.page,
                "discarding superseded listing response"
            );
            None
        }
    }

    fn begin(&self, query: &ProductQuery) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.query = Some(query.clone());
            state.loading = true;
        });
        generation
    }

    async fn fetch(&self, query: &ProductQuery) -> Result<PagedResult<Product>, ViewError> {
        query.validate()?;
        match tokio::time::timeout(self.timeout, self.source.fetch_products(query)).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, page = query.page, "product listing request failed");
                Err(ViewError::from(e))
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis(),
                    page = query.page,
                    "product listing request timed out"
                );
                Err(ViewError::Timeout)
            }
        }
    }
}
