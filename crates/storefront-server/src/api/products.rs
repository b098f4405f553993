use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use storefront_client::{OrderBy, ProductFilters, ProductQuery, SortOrder};
use storefront_core::Product;

use crate::middleware::RequestId;

use super::{
    map_client_error, normalize_per_page, ApiError, ApiResponse, AppState, PageData, ResponseMeta,
};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ProductListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<i64>,
    pub search: Option<String>,
    pub order_by: Option<OrderBy>,
    pub order: Option<SortOrder>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    /// Comma-separated product ids.
    pub include: Option<String>,
    pub brand: Option<i64>,
}

impl ProductListParams {
    fn into_query(self, default_per_page: u32) -> Result<ProductQuery, String> {
        let include_ids = match self.include.as_deref() {
            Some(raw) => parse_id_list(raw)?,
            None => Vec::new(),
        };
        Ok(ProductQuery::new(
            self.page.unwrap_or(1),
            normalize_per_page(self.per_page, default_per_page),
        )
        .with_filters(ProductFilters {
            category: self.category,
            search: self.search,
            order_by: self.order_by,
            order: self.order,
            on_sale: self.on_sale,
            featured: self.featured,
            include_ids,
            brand: self.brand,
        }))
    }
}

fn parse_id_list(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| format!("include must be a comma-separated list of ids, got '{s}'"))
        })
        .collect()
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ApiResponse<PageData<Product>>>, ApiError> {
    let query = params
        .into_query(state.default_per_page)
        .map_err(|reason| ApiError::new(req_id.0.clone(), "validation_error", reason))?;

    let page = state
        .client
        .fetch_products(&query)
        .await
        .map_err(|e| map_client_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: PageData::new(page, query.page, query.per_page),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state
        .client
        .get_product(&slug)
        .await
        .map_err(|e| map_client_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id.0.clone(), "product", &slug))?;

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}
