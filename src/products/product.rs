//! Product record and field-level business rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub sku: String,
}

/// Product fields as received from a client.
///
/// `id` is accepted on the wire but never honored by the store, so any
/// signed integer decodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub sku: String,
}

/// A field rule the draft violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductRuleError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("price must be a non-negative number")]
    InvalidPrice,
}

impl ProductDraft {
    /// Check the business rules the codec does not enforce.
    pub fn check(&self) -> Result<(), ProductRuleError> {
        if self.name.trim().is_empty() {
            return Err(ProductRuleError::EmptyName);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ProductRuleError::InvalidPrice);
        }
        Ok(())
    }

    /// Materialize the draft under a store-assigned id.
    pub(crate) fn into_product(self, id: u64) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            sku: self.sku,
        }
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            id: i64::try_from(product.id).ok(),
            name: product.name,
            description: product.description,
            price: product.price,
            sku: product.sku,
        }
    }
}

/// The products every fresh store starts with.
pub fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Latte".to_string(),
            description: "Frothy milky coffee".to_string(),
            price: 2.45,
            sku: "abc323".to_string(),
        },
        Product {
            id: 2,
            name: "Espresso".to_string(),
            description: "Short and strong coffee without milk".to_string(),
            price: 1.99,
            sku: "fjd34".to_string(),
        },
    ]
}
