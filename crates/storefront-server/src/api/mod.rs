mod brands;
mod categories;
mod products;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_client::{ClientError, CommerceClient};
use storefront_coordinator::ViewError;
use storefront_core::{AppConfig, PagedResult};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Largest page size the proxy forwards upstream.
const MAX_PER_PAGE: u32 = 100;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<CommerceClient>,
    pub default_per_page: u32,
    /// Upper bound for each upstream load made on behalf of one request.
    pub load_timeout: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(client: CommerceClient, config: &AppConfig) -> Self {
        Self {
            client: Arc::new(client),
            default_per_page: config.default_per_page,
            load_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One page of a listing, with the paging inputs echoed back.
#[derive(Debug, Serialize)]
pub(super) struct PageData<T: Serialize> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total: u64,
    total_pages: u64,
}

impl<T: Serialize> PageData<T> {
    pub(super) fn new(result: PagedResult<T>, page: u32, per_page: u32) -> Self {
        Self {
            items: result.items,
            page,
            per_page,
            total: result.total,
            total_pages: result.total_pages,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    upstream: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn not_found(request_id: String, entity: &str, slug: &str) -> Self {
        Self::new(request_id, "not_found", format!("{entity} \"{slug}\" not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "timeout" => StatusCode::GATEWAY_TIMEOUT,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Applies the configured default and the upstream maximum. Zero is passed
/// through so validation can reject it.
pub(super) fn normalize_per_page(per_page: Option<u32>, default: u32) -> u32 {
    per_page.unwrap_or(default).min(MAX_PER_PAGE)
}

pub(super) fn map_client_error(request_id: String, error: &ClientError) -> ApiError {
    match error {
        ClientError::Validation(reason) => ApiError::new(request_id, "validation_error", reason),
        ClientError::NotFound { .. } => {
            ApiError::new(request_id, "not_found", "resource not found upstream")
        }
        ClientError::Timeout { .. } => {
            tracing::warn!(error = %error, "upstream catalog request timed out");
            ApiError::new(request_id, "timeout", "upstream catalog timed out")
        }
        ClientError::RateLimited { .. } => {
            tracing::warn!(error = %error, "upstream catalog rate limited the proxy");
            ApiError::new(request_id, "rate_limited", "upstream catalog is rate limiting")
        }
        _ => {
            tracing::error!(error = %error, "upstream catalog request failed");
            ApiError::new(request_id, "upstream_error", "upstream catalog request failed")
        }
    }
}

pub(super) fn map_view_error(request_id: String, error: &ViewError) -> ApiError {
    match error {
        ViewError::Validation(reason) => ApiError::new(request_id, "validation_error", reason),
        ViewError::NotFound { entity, slug } => ApiError::not_found(request_id, entity, slug),
        ViewError::Timeout => ApiError::new(request_id, "timeout", error.user_message()),
        ViewError::Retrieval(detail) => {
            tracing::error!(detail = %detail, "catalog view failed");
            ApiError::new(request_id, "upstream_error", error.user_message())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

fn catalog_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{slug}", get(products::get_product))
        .route("/api/v1/categories", get(categories::list_categories))
        .route("/api/v1/categories/tree", get(categories::category_tree))
        .route(
            "/api/v1/categories/{slug}/products",
            get(categories::list_category_products),
        )
        .route("/api/v1/brands", get(brands::list_brands))
        .route("/api/v1/brands/{slug}", get(brands::get_brand))
        .route(
            "/api/v1/brands/{slug}/products",
            get(brands::list_brand_products),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(catalog_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.client.list_categories(1, 1).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    upstream: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: upstream catalog unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        upstream: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[must_use]
pub fn rate_limit_state(config: &AppConfig) -> RateLimitState {
    RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
