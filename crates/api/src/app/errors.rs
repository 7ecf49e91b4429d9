use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::{AssembleError, StoreError};
use storefront_orders::OrderError;

pub fn assemble_error_to_response(err: AssembleError) -> axum::response::Response {
    match err {
        AssembleError::Order(OrderError::EmptyOrder) => json_error(
            StatusCode::BAD_REQUEST,
            "empty_order",
            OrderError::EmptyOrder.to_string(),
        ),
        AssembleError::Order(e @ OrderError::InvalidQuantity { .. }) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_quantity", e.to_string())
        }
        AssembleError::Order(e @ OrderError::ProductNotFound(product_id)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "product_not_found",
                "message": e.to_string(),
                "productId": product_id.to_string(),
            })),
        )
            .into_response(),
        AssembleError::Order(e @ OrderError::AmountOverflow) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "amount_overflow", e.to_string())
        }
        AssembleError::RemoteUnavailable(msg) => {
            tracing::error!("product service unavailable: {msg}");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "product_service_unavailable", msg)
        }
        AssembleError::InvalidRemoteResponse(msg) => {
            tracing::error!("invalid product service response: {msg}");
            json_error(StatusCode::BAD_GATEWAY, "bad_gateway", msg)
        }
        AssembleError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Invalid(e) => domain_error_to_response(e),
        StoreError::Duplicate(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Corrupt(msg) | StoreError::Storage(msg) => {
            tracing::error!("store failure: {msg}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

/// Malformed JSON bodies keep axum's status (400/415/422) but get our error shape.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_query", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
