//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store (method, path template) → operation registrations
//! - Resolve a request to an operation plus its id parameter
//! - Return an explicit error instead of a silent default

use axum::http::Method;
use thiserror::Error;

use crate::routing::matcher::{ParamError, PathTemplate, TemplateMatch};

/// Operations the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListProducts,
    CreateProduct,
    UpdateProduct,
}

impl Operation {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListProducts => "list_products",
            Operation::CreateProduct => "create_product",
            Operation::UpdateProduct => "update_product",
        }
    }
}

/// A resolved request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub operation: Operation,
    /// Id captured from the path, for id templates.
    pub id: Option<u64>,
}

/// Why a request could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid route parameter: {0}")]
    InvalidParameter(#[from] ParamError),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    template: PathTemplate,
    operation: Operation,
}

/// Immutable pattern table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The product API: `GET /`, `POST /`, `PUT /{id}`.
    pub fn products() -> Self {
        Self::new()
            .route(Method::GET, PathTemplate::exact("/"), Operation::ListProducts)
            .route(Method::POST, PathTemplate::exact("/"), Operation::CreateProduct)
            .route(Method::PUT, PathTemplate::trailing_id("/"), Operation::UpdateProduct)
    }

    /// Register a route. Earlier registrations take precedence.
    pub fn route(mut self, method: Method, template: PathTemplate, operation: Operation) -> Self {
        tracing::trace!(
            %method,
            template = %template,
            operation = operation.as_str(),
            "Route registered"
        );
        self.routes.push(Route {
            method,
            template,
            operation,
        });
        self
    }

    /// Resolve a method and path.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        let mut rejection = None;

        for route in self.routes.iter().filter(|r| r.method == *method) {
            match route.template.match_path(path) {
                TemplateMatch::Matched(id) => {
                    return Ok(RouteMatch {
                        operation: route.operation,
                        id,
                    })
                }
                TemplateMatch::Rejected(e) => {
                    rejection.get_or_insert(e);
                }
                TemplateMatch::NoMatch => {}
            }
        }

        Err(rejection.map_or(RouteError::MethodNotAllowed, RouteError::InvalidParameter))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
