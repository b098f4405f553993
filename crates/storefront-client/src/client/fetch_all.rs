//! Multi-page list fetch loops for `CommerceClient`.

use serde::de::DeserializeOwned;
use storefront_core::{Brand, Category};

use crate::error::ClientError;

use super::{CommerceClient, FETCH_ALL_PER_PAGE, MAX_PAGES};

impl CommerceClient {
    /// Fetches every category by walking `/categories` until a short page.
    ///
    /// **All-or-nothing semantics**: if any page fails, categories from
    /// earlier pages are discarded and the error is returned. A partial list
    /// would build a tree with silently missing branches.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_categories`].
    /// Returns [`ClientError::PaginationLimit`] after [`MAX_PAGES`] full pages.
    pub async fn fetch_all_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.fetch_all("categories").await
    }

    /// Fetches every brand by walking `/brands` until a short page.
    ///
    /// Same all-or-nothing semantics as [`Self::fetch_all_categories`].
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::list_brands`].
    /// Returns [`ClientError::PaginationLimit`] after [`MAX_PAGES`] full pages.
    pub async fn fetch_all_brands(&self) -> Result<Vec<Brand>, ClientError> {
        self.fetch_all("brands").await
    }

    /// Resolves a category by slug.
    ///
    /// The categories endpoint has no by-slug lookup, so this walks the full
    /// list. The `"uncategorized"` bucket is still returned if asked for by
    /// name; only the tree hides it.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a blank slug; otherwise as
    /// [`Self::fetch_all_categories`].
    pub async fn get_category(&self, slug: &str) -> Result<Option<Category>, ClientError> {
        let slug = super::required_slug(slug, "category")?;
        let categories = self.fetch_all_categories().await?;
        Ok(categories.into_iter().find(|c| c.slug == slug))
    }

    /// Walks `/{resource}` in pages of [`FETCH_ALL_PER_PAGE`] until a short
    /// page, failing once [`MAX_PAGES`] full pages have been read.
    async fn fetch_all<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, ClientError> {
        let mut all = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch: Vec<T> = self
                .list_page(&[resource], page_number(page), FETCH_ALL_PER_PAGE, resource)
                .await?;
            let done = batch.len() < FETCH_ALL_PER_PAGE as usize;
            all.extend(batch);
            if done {
                tracing::debug!(resource, pages = page, items = all.len(), "fetched full listing");
                return Ok(all);
            }
        }
        tracing::warn!(resource, max_pages = MAX_PAGES, "listing did not end within page cap");
        Err(ClientError::PaginationLimit {
            path: resource.to_owned(),
            max_pages: MAX_PAGES,
        })
    }
}

fn page_number(page: usize) -> u32 {
    u32::try_from(page).unwrap_or(u32::MAX)
}
