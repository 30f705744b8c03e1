//! Product validation middleware.
//!
//! # Responsibilities
//! - Read the request body exactly once (size and time bounded)
//! - Decode it through the codec and apply the product field rules
//! - Hand a typed [`ValidatedProduct`] to the wrapped handler, or
//!   short-circuit with a 4xx without ever calling it
//!
//! # Design Decisions
//! - `ValidatedProduct` has a private constructor: a handler that takes one
//!   can only be reached through this middleware
//! - No request extensions: the decoded record is a plain argument

use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::future::Future;
use std::time::Duration;

use crate::http::codec;
use crate::http::error::ApiError;
use crate::products::ProductDraft;

/// Limits applied while reading a request body.
#[derive(Debug, Clone, Copy)]
pub struct BodyPolicy {
    pub max_bytes: usize,
    pub read_timeout: Duration,
}

/// A request body that decoded and passed the field rules.
#[derive(Debug)]
pub struct ValidatedProduct(ProductDraft);

impl ValidatedProduct {
    pub fn draft(&self) -> &ProductDraft {
        &self.0
    }

    pub fn into_draft(self) -> ProductDraft {
        self.0
    }
}

/// Read, decode and validate a product body.
pub async fn read_product(body: Body, policy: BodyPolicy) -> Result<ValidatedProduct, ApiError> {
    let collected = tokio::time::timeout(
        policy.read_timeout,
        Limited::new(body, policy.max_bytes).collect(),
    )
    .await;

    let bytes = match collected {
        Ok(Ok(collected)) => collected.to_bytes(),
        Ok(Err(e)) if e.is::<LengthLimitError>() => return Err(ApiError::PayloadTooLarge),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Failed to read request body");
            return Err(ApiError::BodyRead);
        }
        Err(_) => return Err(ApiError::RequestTimeout),
    };

    let draft = codec::decode_product(&bytes)?;
    draft.check()?;
    Ok(ValidatedProduct(draft))
}

/// Run `handler` with the validated body, or answer the rejection.
pub async fn with_validated_product<F, Fut>(body: Body, policy: BodyPolicy, handler: F) -> Response
where
    F: FnOnce(ValidatedProduct) -> Fut,
    Fut: Future<Output = Result<Response, ApiError>>,
{
    match read_product(body, policy).await {
        Ok(product) => handler(product).await.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Product validation failed");
            e.into_response()
        }
    }
}
