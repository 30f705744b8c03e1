//! In-memory product store.
//!
//! # Responsibilities
//! - Own the ordered product collection
//! - Assign ids (max existing id + 1)
//! - Serialize every read and write through one mutex

use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::products::product::{seed_products, Product, ProductDraft};

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No product has the requested id.
    #[error("product {0} not found")]
    NotFound(u64),

    /// A writer panicked while holding the lock.
    #[error("product store lock poisoned")]
    Poisoned,
}

/// Thread-safe holder of all products.
///
/// Shared between request tasks via `Arc<ProductStore>`.
#[derive(Debug, Default)]
pub struct ProductStore {
    products: Mutex<Vec<Product>>,
}

impl ProductStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the seed products.
    pub fn seeded() -> Self {
        Self::from_products(seed_products())
    }

    /// Create a store from existing records. Ids must already be unique.
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Product>>, StoreError> {
        self.products.lock().map_err(|_| StoreError::Poisoned)
    }

    /// All products in insertion order.
    pub fn all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Look up a single product.
    pub fn get(&self, id: u64) -> Result<Product, StoreError> {
        self.lock()?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Insert a product under the next free id and return the stored record.
    pub fn add(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut products = self.lock()?;
        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = draft.into_product(id);
        products.push(product.clone());
        tracing::debug!(id, total = products.len(), "Product added");
        Ok(product)
    }

    /// Replace the fields of an existing product, keeping its id.
    pub fn update(&self, id: u64, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut products = self.lock()?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = draft.into_product(id);
        Ok(slot.clone())
    }

    /// Number of stored products.
    pub fn len(&self) -> usize {
        self.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
