//! HTTP-facing error taxonomy.
//!
//! Every failure a client can observe is an [`ApiError`]; its
//! `IntoResponse` impl owns the status code and the short plain-text body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::codec::CodecError;
use crate::products::{ProductRuleError, StoreError};
use crate::routing::{ParamError, RouteError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed payload")]
    MalformedPayload,

    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductRuleError),

    #[error("invalid route parameter: {0}")]
    InvalidRouteParameter(ParamError),

    #[error("request body could not be read")]
    BodyRead,

    #[error("product {0} not found")]
    NotFound(u64),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request body timed out")]
    RequestTimeout,

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("encoding failed")]
    Encoding,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload
            | ApiError::InvalidProduct(_)
            | ApiError::InvalidRouteParameter(_)
            | ApiError::BodyRead => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Encoding | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client. Never includes internal detail.
    fn message(&self) -> String {
        match self {
            ApiError::MalformedPayload => "Unable to unmarshal json".into(),
            ApiError::InvalidProduct(rule) => format!("Invalid product: {rule}"),
            ApiError::InvalidRouteParameter(_) => "Invalid URI".into(),
            ApiError::BodyRead => "Unable to read request body".into(),
            ApiError::NotFound(_) => "Product not found".into(),
            ApiError::MethodNotAllowed => String::new(),
            ApiError::RequestTimeout => "Request body timed out".into(),
            ApiError::PayloadTooLarge => "Request body too large".into(),
            ApiError::Encoding => "Unable to marshal json".into(),
            ApiError::Internal(_) => "Internal store error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let message = self.message();
        if message.is_empty() {
            status.into_response()
        } else {
            (status, format!("{message}\n")).into_response()
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ApiError::NotFound(id),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Malformed(_) => ApiError::MalformedPayload,
            CodecError::Encoding(_) => ApiError::Encoding,
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::MethodNotAllowed => ApiError::MethodNotAllowed,
            RouteError::InvalidParameter(p) => ApiError::InvalidRouteParameter(p),
        }
    }
}
