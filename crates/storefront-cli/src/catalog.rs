//! Command handlers. Each returns the rendered text for `main` to print.

use std::sync::Arc;
use std::time::Duration;

use storefront_client::{CommerceClient, ProductQuery};
use storefront_coordinator::{
    BrandProductsCoordinator, CategoryProductsCoordinator, DependentState, ListingCoordinator,
    ViewError,
};
use storefront_core::{build_category_tree, AppConfig, PagedResult, Product};

use crate::render;

pub(crate) struct Catalog {
    client: Arc<CommerceClient>,
    per_page: u32,
    timeout: Duration,
}

impl Catalog {
    pub(crate) fn new(client: CommerceClient, per_page: u32, timeout: Duration) -> Self {
        Self {
            client: Arc::new(client),
            per_page,
            timeout,
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = CommerceClient::from_config(config)
            .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))?;
        Ok(Self::new(
            client,
            config.default_per_page,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    pub(crate) fn default_per_page(&self) -> u32 {
        self.per_page
    }

    pub(crate) async fn categories(&self) -> anyhow::Result<String> {
        let categories = self.client.fetch_all_categories().await?;
        let tree = build_category_tree(&categories);
        if tree.is_empty() {
            return Ok("No categories.\n".to_owned());
        }
        Ok(render::category_tree(&tree))
    }

    pub(crate) async fn products(&self, query: ProductQuery) -> anyhow::Result<String> {
        let page = query.page;
        let listing = ListingCoordinator::new(Arc::clone(&self.client), self.timeout);
        listing.set_query(query).await;

        let state = listing.snapshot();
        if let Some(error) = state.error {
            return Err(user_facing(&error));
        }
        let result = PagedResult {
            items: state.items,
            total: state.total,
            total_pages: state.total_pages,
        };
        Ok(render::product_page(&result, page))
    }

    pub(crate) async fn product(&self, slug: &str) -> anyhow::Result<String> {
        match self.client.get_product(slug).await? {
            Some(product) => Ok(render::product_detail(&product)),
            None => Err(user_facing(&ViewError::NotFound {
                entity: "product",
                slug: slug.to_owned(),
            })),
        }
    }

    pub(crate) async fn brands(&self) -> anyhow::Result<String> {
        let brands = self.client.fetch_all_brands().await?;
        if brands.is_empty() {
            return Ok("No brands.\n".to_owned());
        }
        Ok(render::brand_list(&brands))
    }

    pub(crate) async fn brand(&self, slug: &str, page: u32) -> anyhow::Result<String> {
        let coordinator =
            BrandProductsCoordinator::new(Arc::clone(&self.client), self.per_page, self.timeout);
        coordinator.open_at(slug, page).await;

        let (brand, page, products) = settle(coordinator.snapshot(), "brand")?;
        Ok(format!(
            "{}\n{}",
            render::brand_header(&brand),
            render::product_page(&products, page)
        ))
    }

    pub(crate) async fn category(&self, slug: &str, page: u32) -> anyhow::Result<String> {
        let coordinator =
            CategoryProductsCoordinator::new(Arc::clone(&self.client), self.per_page, self.timeout);
        coordinator.open_at(slug, page).await;

        let (category, page, products) = settle(coordinator.snapshot(), "category")?;
        Ok(format!(
            "{} [{}]\n\n{}",
            category.name,
            category.slug,
            render::product_page(&products, page)
        ))
    }
}

/// Unpacks a settled dependent view, turning every non-loaded state into an
/// error with a shopper-facing message.
fn settle<E>(
    state: DependentState<E>,
    entity: &'static str,
) -> anyhow::Result<(E, u32, PagedResult<Product>)> {
    match state {
        DependentState::ChildrenLoaded {
            parent,
            page,
            products,
        } => Ok((parent, page, products)),
        DependentState::ParentNotFound { slug } => {
            Err(user_facing(&ViewError::NotFound { entity, slug }))
        }
        DependentState::ParentError { error, .. } | DependentState::ChildrenError { error, .. } => {
            Err(user_facing(&error))
        }
        DependentState::Idle
        | DependentState::ResolvingParent { .. }
        | DependentState::LoadingChildren { .. } => {
            anyhow::bail!("{entity} view did not settle")
        }
    }
}

fn user_facing(error: &ViewError) -> anyhow::Error {
    tracing::debug!(error = %error, "catalog view failed");
    anyhow::anyhow!(error.user_message())
}
