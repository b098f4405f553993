use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use storefront_coordinator::{CategoryProductsCoordinator, DependentState};
use storefront_core::{build_category_tree, Category, HierarchicalCategory, Product};

use crate::middleware::RequestId;

use super::{
    map_client_error, map_view_error, normalize_per_page, ApiError, ApiResponse, AppState,
    PageData, ResponseMeta,
};

#[derive(Debug, Default, Deserialize)]
pub(super) struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryProducts {
    category: Category,
    products: PageData<Product>,
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = state
        .client
        .fetch_all_categories()
        .await
        .map_err(|e| map_client_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: categories,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn category_tree(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<HierarchicalCategory>>>, ApiError> {
    let categories = state
        .client
        .fetch_all_categories()
        .await
        .map_err(|e| map_client_error(req_id.0.clone(), &e))?;
    let tree = build_category_tree(&categories);
    tracing::debug!(
        categories = categories.len(),
        roots = tree.len(),
        "built category tree"
    );

    Ok(Json(ApiResponse {
        data: tree,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_category_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ApiResponse<CategoryProducts>>, ApiError> {
    let per_page = normalize_per_page(params.per_page, state.default_per_page);
    let coordinator =
        CategoryProductsCoordinator::new(state.client.clone(), per_page, state.load_timeout);
    coordinator.open_at(&slug, params.page.unwrap_or(1)).await;

    match coordinator.snapshot() {
        DependentState::ChildrenLoaded {
            parent,
            page,
            products,
        } => Ok(Json(ApiResponse {
            data: CategoryProducts {
                category: parent,
                products: PageData::new(products, page, per_page),
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        DependentState::ParentNotFound { slug } => {
            Err(ApiError::not_found(req_id.0, "category", &slug))
        }
        DependentState::ParentError { error, .. } | DependentState::ChildrenError { error, .. } => {
            Err(map_view_error(req_id.0, &error))
        }
        other => {
            tracing::error!(state = ?other, "category view did not settle");
            Err(ApiError::new(req_id.0, "internal_error", "category view did not settle"))
        }
    }
}
