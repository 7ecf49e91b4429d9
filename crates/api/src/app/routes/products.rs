use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_core::ProductId;
use storefront_infra::ProductStore;

use crate::app::{dto, errors};
use crate::app::services::ProductServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/list", get(list_products_by_ids))
        .route("/:id", get(get_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<ProductServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.products().create(body.into()).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, price = %product.price, "product created");
            (StatusCode::CREATED, Json(product)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Single lookup. An unknown id yields `200` with a `null` body, not an error.
pub async fn get_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match services.products().find_by_id(product_id).await {
        Ok(found) => (StatusCode::OK, Json(found)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<ProductServices>>,
) -> axum::response::Response {
    match services.products().find_all().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Batch lookup used by the order service: `GET /products/list?ids=a,b,c`.
pub async fn list_products_by_ids(
    Extension(services): Extension<Arc<ProductServices>>,
    query: Result<Query<dto::ProductIdsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    let ids = match ProductId::parse_list(query.ids.as_deref().unwrap_or_default()) {
        Ok(ids) => ids,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.products().find_by_ids(&ids).await {
        Ok(items) => {
            tracing::debug!(requested = ids.len(), found = items.len(), "batch product lookup");
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
