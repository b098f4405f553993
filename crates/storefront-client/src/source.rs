//! The read-only catalog operations the coordinators depend on.

use std::future::Future;

use storefront_core::{Brand, Category, PagedResult, Product};

use crate::client::CommerceClient;
use crate::error::ClientError;
use crate::query::ProductQuery;

/// Catalog lookups needed by listing and detail views.
///
/// [`CommerceClient`] is the production implementation; tests substitute an
/// in-memory catalog.
pub trait CatalogSource: Send + Sync {
    /// One page of products matching `query`.
    fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<PagedResult<Product>, ClientError>> + Send;

    /// A brand by slug, `None` if it does not exist.
    fn find_brand(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Brand>, ClientError>> + Send;

    /// A category by slug, `None` if it does not exist.
    fn find_category(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Category>, ClientError>> + Send;
}

impl CatalogSource for CommerceClient {
    async fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> Result<PagedResult<Product>, ClientError> {
        CommerceClient::fetch_products(self, query).await
    }

    async fn find_brand(&self, slug: &str) -> Result<Option<Brand>, ClientError> {
        self.get_brand(slug).await
    }

    async fn find_category(&self, slug: &str) -> Result<Option<Category>, ClientError> {
        self.get_category(slug).await
    }
}
