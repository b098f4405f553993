//! Two-phase views: resolve a parent entity by slug, then list its products.
//!
//! The product listing is never requested until the parent has resolved. A
//! slug that does not resolve ends in [`DependentState::ParentNotFound`] and
//! no product request is made at all.

use std::fmt::Debug;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use storefront_client::{CatalogSource, ClientError, ProductQuery};
use storefront_core::{Brand, Category, PagedResult, Product};
use tokio::sync::watch;

use crate::error::ViewError;
use crate::listing::ListingCoordinator;
use crate::LoadOutcome;

/// A parent entity that scopes a product listing.
pub trait ParentScope: Send + Sync + 'static {
    type Entity: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Lower-case entity name used in messages, e.g. `"brand"`.
    const ENTITY: &'static str;

    fn slug(entity: &Self::Entity) -> &str;

    fn resolve<S: CatalogSource>(
        source: &S,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Self::Entity>, ClientError>> + Send;

    /// Restricts `query` to products belonging to `entity`.
    fn scope(entity: &Self::Entity, query: ProductQuery) -> ProductQuery;
}

/// Products of one brand.
pub struct BrandScope;

impl ParentScope for BrandScope {
    type Entity = Brand;
    const ENTITY: &'static str = "brand";

    fn slug(entity: &Brand) -> &str {
        &entity.slug
    }

    async fn resolve<S: CatalogSource>(
        source: &S,
        slug: &str,
    ) -> Result<Option<Brand>, ClientError> {
        source.find_brand(slug).await
    }

    fn scope(entity: &Brand, query: ProductQuery) -> ProductQuery {
        query.with_brand(entity.id)
    }
}

/// Products of one category.
pub struct CategoryScope;

impl ParentScope for CategoryScope {
    type Entity = Category;
    const ENTITY: &'static str = "category";

    fn slug(entity: &Category) -> &str {
        &entity.slug
    }

    async fn resolve<S: CatalogSource>(
        source: &S,
        slug: &str,
    ) -> Result<Option<Category>, ClientError> {
        source.find_category(slug).await
    }

    fn scope(entity: &Category, query: ProductQuery) -> ProductQuery {
        query.with_category(entity.id)
    }
}

/// States of a [`DependentCoordinator`].
///
/// Only the `Children*` states carry a resolved parent, and only they accept
/// page changes.
#[derive(Debug, Clone, PartialEq)]
pub enum DependentState<E> {
    Idle,
    ResolvingParent {
        slug: String,
    },
    ParentNotFound {
        slug: String,
    },
    ParentError {
        slug: String,
        error: ViewError,
    },
    LoadingChildren {
        parent: E,
        page: u32,
    },
    ChildrenLoaded {
        parent: E,
        page: u32,
        products: PagedResult<Product>,
    },
    ChildrenError {
        parent: E,
        page: u32,
        error: ViewError,
    },
}

impl<E> DependentState<E> {
    /// The resolved parent, once resolution has succeeded.
    pub fn parent(&self) -> Option<&E> {
        match self {
            DependentState::LoadingChildren { parent, .. }
            | DependentState::ChildrenLoaded { parent, .. }
            | DependentState::ChildrenError { parent, .. } => Some(parent),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            DependentState::ResolvingParent { .. } | DependentState::LoadingChildren { .. }
        )
    }

    pub fn error(&self) -> Option<&ViewError> {
        match self {
            DependentState::ParentError { error, .. } | DependentState::ChildrenError { error, .. } => {
                Some(error)
            }
            _ => None,
        }
    }

    pub fn page(&self) -> Option<u32> {
        match self {
            DependentState::LoadingChildren { page, .. }
            | DependentState::ChildrenLoaded { page, .. }
            | DependentState::ChildrenError { page, .. } => Some(*page),
            _ => None,
        }
    }
}

pub type BrandProductsCoordinator<S> = DependentCoordinator<S, BrandScope>;
pub type CategoryProductsCoordinator<S> = DependentCoordinator<S, CategoryScope>;

/// Resolves a parent by slug, then drives a paginated listing scoped to it.
///
/// Opening a different slug resets the whole machine; anything still in
/// flight for the previous slug is discarded when it arrives.
pub struct DependentCoordinator<S, P: ParentScope> {
    source: Arc<S>,
    listing: ListingCoordinator<S>,
    per_page: u32,
    timeout: Duration,
    generation: AtomicU64,
    state: watch::Sender<DependentState<P::Entity>>,
}

impl<S: CatalogSource, P: ParentScope> DependentCoordinator<S, P> {
    #[must_use]
    pub fn new(source: Arc<S>, per_page: u32, timeout: Duration) -> Self {
        let (state, _) = watch::channel(DependentState::Idle);
        Self {
            listing: ListingCoordinator::new(Arc::clone(&source), timeout),
            source,
            per_page,
            timeout,
            generation: AtomicU64::new(0),
            state,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DependentState<P::Entity>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> DependentState<P::Entity> {
        self.state.borrow().clone()
    }

    /// Resolves `slug` and, if found, loads the first page of its products.
    ///
    /// Re-opening the slug that is already resolving or resolved is
    /// [`LoadOutcome::Unchanged`]; use [`Self::set_page`] to move between
    /// pages.
    pub async fn open(&self, slug: &str) -> LoadOutcome {
        let slug = slug.trim();
        if self.is_current(slug) {
            return LoadOutcome::Unchanged;
        }
        self.resolve_and_load(slug, 1).await
    }

    /// Like [`Self::open`], but lands on `page`. For the slug that is already
    /// resolved this is [`Self::set_page`].
    pub async fn open_at(&self, slug: &str, page: u32) -> LoadOutcome {
        let slug = slug.trim();
        if self.is_current(slug) {
            return self.set_page(page).await;
        }
        self.resolve_and_load(slug, page).await
    }

    fn is_current(&self, slug: &str) -> bool {
        if slug.is_empty() {
            return false;
        }
        match &*self.state.borrow() {
            DependentState::ResolvingParent { slug: current } => current == slug,
            state => state.parent().is_some_and(|p| P::slug(p) == slug),
        }
    }

    async fn resolve_and_load(&self, slug: &str, page: u32) -> LoadOutcome {
        if slug.is_empty() {
            self.begin(DependentState::ParentError {
                slug: String::new(),
                error: ViewError::Validation(format!("{} slug is required", P::ENTITY)),
            });
            return LoadOutcome::Committed;
        }

        let generation = self.begin(DependentState::ResolvingParent {
            slug: slug.to_owned(),
        });

        let resolved = tokio::time::timeout(self.timeout, P::resolve(&*self.source, slug)).await;
        let parent = match resolved {
            Ok(Ok(Some(parent))) => parent,
            Ok(Ok(None)) => {
                tracing::debug!(entity = P::ENTITY, slug, "parent not found");
                return self.commit(
                    generation,
                    DependentState::ParentNotFound {
                        slug: slug.to_owned(),
                    },
                );
            }
            Ok(Err(e)) => {
                tracing::warn!(entity = P::ENTITY, slug, error = %e, "parent lookup failed");
                return self.commit(
                    generation,
                    DependentState::ParentError {
                        slug: slug.to_owned(),
                        error: ViewError::from(e),
                    },
                );
            }
            Err(_) => {
                tracing::warn!(entity = P::ENTITY, slug, "parent lookup timed out");
                return self.commit(
                    generation,
                    DependentState::ParentError {
                        slug: slug.to_owned(),
                        error: ViewError::Timeout,
                    },
                );
            }
        };

        self.enter_page(generation, parent, page).await
    }

    /// Loads another page for the resolved parent without resolving it again.
    ///
    /// Returns [`LoadOutcome::NotReady`] unless a parent has been resolved.
    pub async fn set_page(&self, page: u32) -> LoadOutcome {
        let parent = {
            let state = self.state.borrow();
            if let DependentState::ChildrenLoaded { page: current, .. } = &*state {
                if *current == page {
                    return LoadOutcome::Unchanged;
                }
            }
            match state.parent() {
                Some(parent) => parent.clone(),
                None => return LoadOutcome::NotReady,
            }
        };
        let generation = self.generation.load(Ordering::SeqCst);
        self.enter_page(generation, parent, page).await
    }

    /// Re-issues the current child page, e.g. after a listing error.
    pub async fn reload(&self) -> LoadOutcome {
        let (parent, page) = {
            let state = self.state.borrow();
            match (state.parent(), state.page()) {
                (Some(parent), Some(page)) => (parent.clone(), page),
                _ => return LoadOutcome::NotReady,
            }
        };
        let generation = self.generation.load(Ordering::SeqCst);
        self.enter_page(generation, parent, page).await
    }

    async fn enter_page(&self, generation: u64, parent: P::Entity, page: u32) -> LoadOutcome {
        let loading = DependentState::LoadingChildren {
            parent: parent.clone(),
            page,
        };
        if self.commit(generation, loading) == LoadOutcome::Superseded {
            return LoadOutcome::Superseded;
        }

        let query = P::scope(&parent, ProductQuery::new(page, self.per_page));
        let Some(result) = self.listing.run(query).await else {
            return LoadOutcome::Superseded;
        };
        let next = match result {
            Ok(products) => DependentState::ChildrenLoaded {
                parent,
                page,
                products,
            },
            Err(error) => DependentState::ChildrenError {
                parent,
                page,
                error,
            },
        };
        self.commit(generation, next)
    }

    /// Starts a new generation and publishes `next` as its first state.
    fn begin(&self, next: DependentState<P::Entity>) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = next;
        });
        generation
    }

    fn commit(&self, generation: u64, next: DependentState<P::Entity>) -> LoadOutcome {
        let committed = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        });
        if committed {
            LoadOutcome::Committed
        } else {
            tracing::debug!(entity = P::ENTITY, generation, "discarding superseded state");
            LoadOutcome::Superseded
        }
    }
}
