//! # Catalog View
//!
//! In-memory view of the products referenced by one registration, loaded once
//! through a batch lookup and keyed by id.
//!
//! ```text
//! find_by_ids([1, 4, 4, 9]) ──► [Product 1, Product 4]
//!                                     │
//!                                     ▼
//!                          Catalog { 1 → .., 4 → .. }
//!                                     │
//!                     resolver reads, reconciler mutates
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{Product, ProductId};

/// Products keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: BTreeMap<ProductId, Product>,
}

impl Catalog {
    /// Builds a catalog from a batch lookup result. A repeated id keeps the
    /// last product seen.
    pub fn from_products<I>(products: I) -> Self
    where
        I: IntoIterator<Item = Product>,
    {
        Catalog {
            products: products.into_iter().map(|p| (p.id(), p)).collect(),
        }
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.get_mut(&id)
    }

    /// Looks up a product, failing with `ProductNotFound`.
    pub fn require(&self, id: ProductId) -> CoreResult<&Product> {
        self.get(id).ok_or(CoreError::ProductNotFound(id))
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.products.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in id order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}
