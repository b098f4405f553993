use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use storefront_coordinator::{BrandProductsCoordinator, DependentState};
use storefront_core::{Brand, Product};

use crate::middleware::RequestId;

use super::categories::PageParams;
use super::{
    map_client_error, map_view_error, normalize_per_page, ApiError, ApiResponse, AppState,
    PageData, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct BrandProducts {
    brand: Brand,
    products: PageData<Product>,
}

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Brand>>>, ApiError> {
    let brands = state
        .client
        .fetch_all_brands()
        .await
        .map_err(|e| map_client_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: brands,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Brand>>, ApiError> {
    let brand = state
        .client
        .get_brand(&slug)
        .await
        .map_err(|e| map_client_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id.0.clone(), "brand", &slug))?;

    Ok(Json(ApiResponse {
        data: brand,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Resolves the brand first; its products are only requested once the brand
/// exists.
pub(super) async fn list_brand_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<BrandProducts>>, ApiError> {
    let per_page = normalize_per_page(params.per_page, state.default_per_page);
    let coordinator =
        BrandProductsCoordinator::new(state.client.clone(), per_page, state.load_timeout);
    coordinator.open_at(&slug, params.page.unwrap_or(1)).await;

    match coordinator.snapshot() {
        DependentState::ChildrenLoaded {
            parent,
            page,
            products,
        } => Ok(Json(ApiResponse {
            data: BrandProducts {
                brand: parent,
                products: PageData::new(products, page, per_page),
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        DependentState::ParentNotFound { slug } => {
            Err(ApiError::not_found(req_id.0, "brand", &slug))
        }
        DependentState::ParentError { error, .. } | DependentState::ChildrenError { error, .. } => {
            Err(map_view_error(req_id.0, &error))
        }
        other => {
            tracing::error!(state = ?other, "brand view did not settle");
            Err(ApiError::new(req_id.0, "internal_error", "brand view did not settle"))
        }
    }
}
