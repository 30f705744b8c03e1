//! HTTP client for the product API.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// A product as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub sku: String,
}

/// Fields sent when creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub sku: String,
}

impl NewProduct {
    pub fn new(name: &str, price: f64, sku: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            price,
            sku: sku.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ClientError {
    /// Transport or decoding failure.
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status { status: StatusCode, body: String },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "HTTP error: {}", e),
            ClientError::Status { status, body } => {
                write!(f, "product API returned {}: {}", status, body.trim_end())
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

impl ClientError {
    /// Status code of a rejected request, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub struct ProductClient {
    client: Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured reqwest client (timeouts, pooling).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    /// All products in insertion order.
    pub async fn list(&self) -> Result<Vec<Product>, ClientError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Create a product; returns the stored record with its assigned id.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, ClientError> {
        let resp = self
            .client
            .post(format!("{}/", self.base_url))
            .json(product)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Replace the fields of product `id`.
    pub async fn update(&self, id: u64, product: &NewProduct) -> Result<(), ClientError> {
        let resp = self
            .client
            .put(format!("{}/{}", self.base_url, id))
            .json(product)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
