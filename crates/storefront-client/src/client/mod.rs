//! HTTP client for the commerce REST API.

mod endpoint;
mod fetch_all;

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode, Url};
use storefront_core::{
    AppConfig, Brand, Category, CredentialPlacement, Credentials, PagedResult, Product,
    TotalsSource,
};

use crate::error::ClientError;
use crate::pagination::{assemble_page, parse_listing_body, totals_from_headers};
use crate::query::ProductQuery;

use endpoint::normalise_base_url;

/// Maximum number of pages [`CommerceClient::fetch_all_categories`] and
/// [`CommerceClient::fetch_all_brands`] will walk before giving up.
pub(super) const MAX_PAGES: usize = 50;

/// Page size used when walking a whole list endpoint.
pub(super) const FETCH_ALL_PER_PAGE: u32 = 100;

/// Client for the commerce REST API.
///
/// Holds the HTTP client, the normalised base URL and, when talking to the
/// API directly rather than through the proxy, the consumer credential.
/// Nothing is retried: every failure is returned to the caller as a typed
/// [`ClientError`].
pub struct CommerceClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    placement: CredentialPlacement,
    totals_source: TotalsSource,
}

impl CommerceClient {
    /// Creates a client without credentials, reading totals from headers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`ClientError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let base_url = normalise_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            credentials: None,
            placement: CredentialPlacement::Header,
            totals_source: TotalsSource::Headers,
        })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`CommerceClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        let mut client = Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_totals_source(config.totals_source);
        if let Some(credentials) = &config.credentials {
            client = client.with_credentials(credentials.clone(), config.credential_placement);
        }
        Ok(client)
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials, placement: CredentialPlacement) -> Self {
        self.credentials = Some(credentials);
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn with_totals_source(mut self, totals_source: TotalsSource) -> Self {
        self.totals_source = totals_source;
        self
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Fetches one page of products matching `query`.
    ///
    /// A page past the last one is not an error: whatever the API returns
    /// for it (usually no items) is passed through.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Validation`] if `page` or `per_page` is zero (no request is sent).
    /// - [`ClientError::RateLimited`] on HTTP 429.
    /// - [`ClientError::NotFound`] / [`ClientError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`ClientError::Timeout`] / [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a product list.
    pub async fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> Result<PagedResult<Product>, ClientError> {
        query.validate()?;
        let url = self.endpoint(&["products"], &query.to_params())?;
        let (headers, body) = self.get_json(url).await?;
        let listing = parse_listing_body::<Product>(body, "products listing")?;
        let page = assemble_page(
            listing.items,
            query.page,
            query.per_page,
            self.totals_source,
            totals_from_headers(&headers),
            listing.totals,
        );
        tracing::debug!(
            page = query.page,
            per_page = query.per_page,
            returned = page.items.len(),
            total = page.total,
            total_pages = page.total_pages,
            "fetched products page"
        );
        Ok(page)
    }

    /// Fetches a single product by numeric id or slug.
    ///
    /// Returns `Ok(None)` on 404 or when the API answers with an empty list.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::fetch_products`], except that not-found is
    /// `Ok(None)`.
    pub async fn get_product(&self, id_or_slug: &str) -> Result<Option<Product>, ClientError> {
        let id_or_slug = required_slug(id_or_slug, "product")?;
        let url = self.endpoint(&["products", id_or_slug], &[])?;
        self.get_single(url, "product").await
    }

    /// Fetches one page of categories.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::fetch_products`].
    pub async fn list_categories(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Category>, ClientError> {
        self.list_page(&["categories"], page, per_page, "categories listing")
            .await
    }

    /// Fetches one page of brands.
    ///
    /// # Errors
    ///
    /// Same as [`CommerceClient::fetch_products`].
    pub async fn list_brands(&self, page: u32, per_page: u32) -> Result<Vec<Brand>, ClientError> {
        self.list_page(&["brands"], page, per_page, "brands listing")
            .await
    }

    /// Fetches a brand by slug. Returns `Ok(None)` if no such brand exists.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a blank slug; otherwise as
    /// [`CommerceClient::get_product`].
    pub async fn get_brand(&self, slug: &str) -> Result<Option<Brand>, ClientError> {
        let slug = required_slug(slug, "brand")?;
        let url = self.endpoint(&["brands", slug], &[])?;
        self.get_single(url, "brand").await
    }

    async fn list_page<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        page: u32,
        per_page: u32,
        context: &str,
    ) -> Result<Vec<T>, ClientError> {
        ProductQuery::new(page, per_page).validate()?;
        let params = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let url = self.endpoint(segments, &params)?;
        let (_, body) = self.get_json(url).await?;
        Ok(parse_listing_body::<T>(body, context)?.items)
    }

    /// GETs an entity endpoint that may answer with the object itself, a
    /// one-element list, an empty list or 404.
    async fn get_single<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<Option<T>, ClientError> {
        let body = match self.get_json(url).await {
            Ok((_, body)) => body,
            Err(ClientError::NotFound { path }) => {
                tracing::debug!(path, "{context} not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let value = match body {
            serde_json::Value::Array(mut items) => {
                if items.is_empty() {
                    return Ok(None);
                }
                items.swap_remove(0)
            }
            other => other,
        };

        serde_json::from_value::<T>(value)
            .map(Some)
            .map_err(|e| ClientError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
    }

    /// Sends a GET, maps non-2xx statuses to typed errors and parses the body
    /// as JSON.
    async fn get_json(&self, url: Url) -> Result<(HeaderMap, serde_json::Value), ClientError> {
        let path = url.path().to_owned();
        tracing::debug!(path, "GET commerce API");

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let (Some(credentials), CredentialPlacement::Header) = (&self.credentials, self.placement) {
            request = request.basic_auth(
                &credentials.consumer_key,
                Some(&credentials.consumer_secret),
            );
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ClientError::RateLimited { retry_after_secs });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound { path });
        }

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path, "commerce API returned an error status");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                path,
            });
        }

        let headers = response.headers().clone();
        let body = response.text().await?;
        let json = serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: path,
            source: e,
        })?;
        Ok((headers, json))
    }
}

fn required_slug<'a>(slug: &'a str, entity: &str) -> Result<&'a str, ClientError> {
    let trimmed = slug.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(format!("{entity} slug is required")));
    }
    Ok(trimmed)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
