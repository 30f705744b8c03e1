//! JSON wire format for products.
//!
//! Structural well-formedness only; field rules live in
//! [`ProductDraft::check`](crate::products::ProductDraft::check).

use axum::body::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::products::{Product, ProductDraft};

/// Content type of every encoded payload.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The client sent bytes that are not a product.
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A stored value could not be serialized.
    #[error("encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Bytes, CodecError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(CodecError::Encoding)
}

/// Encode one product.
pub fn encode_product(product: &Product) -> Result<Bytes, CodecError> {
    encode(product)
}

/// Encode a list of products as a JSON array, preserving order.
pub fn encode_products(products: &[Product]) -> Result<Bytes, CodecError> {
    encode(products)
}

/// Decode a request body into a draft.
pub fn decode_product(body: &[u8]) -> Result<ProductDraft, CodecError> {
    serde_json::from_slice(body).map_err(CodecError::Malformed)
}
