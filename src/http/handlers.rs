//! Product request handlers.
//!
//! Handlers receive the store explicitly and, for mutating operations, a
//! [`ValidatedProduct`] produced by the validation middleware.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::codec::{self, CONTENT_TYPE_JSON};
use crate::http::error::ApiError;
use crate::http::validation::ValidatedProduct;
use crate::observability::metrics;
use crate::products::ProductStore;

fn json_response(status: StatusCode, body: axum::body::Bytes) -> Response {
    (status, [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)], Body::from(body)).into_response()
}

/// `GET /`: every product, in insertion order.
pub async fn list_products(store: &ProductStore) -> Result<Response, ApiError> {
    tracing::info!("Handle GET Products");

    let products = store.all()?;
    let body = codec::encode_products(&products)?;
    Ok(json_response(StatusCode::OK, body))
}

/// `POST /`: store a new product under a fresh id and echo it back.
pub async fn create_product(
    store: &ProductStore,
    product: ValidatedProduct,
) -> Result<Response, ApiError> {
    tracing::info!("Handle POST Product");

    let stored = store.add(product.into_draft())?;
    metrics::record_store_size(store.len());
    tracing::info!(id = stored.id, name = %stored.name, "Product created");

    let body = codec::encode_product(&stored)?;
    Ok(json_response(StatusCode::OK, body))
}

/// `PUT /{id}`: replace the fields of an existing product.
pub async fn update_product(
    store: &ProductStore,
    id: u64,
    product: ValidatedProduct,
) -> Result<Response, ApiError> {
    tracing::info!(id, "Handle PUT Product");

    store.update(id, product.into_draft())?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
