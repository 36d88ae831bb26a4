//! # Order Line Resolver
//!
//! Maps each requested `(productId, quantity)` to a product snapshot, in
//! request order.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  requests: [ {1, 3}, {99, 1}, {42, 2} ]                                 │
//! │                 │        │                                              │
//! │                 ▼        ▼                                              │
//! │           resolved    ProductNotFound(99)  ◄── stop here               │
//! │                                                                         │
//! │  Id 42 is never looked at. Missing products are a client mistake and   │
//! │  are not enumerated, unlike stock shortages (see reconciler).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::catalog::Catalog;
use crate::error::CoreResult;
use crate::types::{OrderLineRequest, ProductId, ProductSnapshot};

/// A request line bound to the product it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub product: ProductSnapshot,
    pub quantity: i64,
}

/// Resolves every request against the catalog.
///
/// ## Returns
/// * `Ok(lines)` - one line per request, same order
/// * `Err(ProductNotFound)` - first request whose id is not in the catalog
pub fn resolve_lines(requests: &[OrderLineRequest], catalog: &Catalog) -> CoreResult<Vec<ResolvedLine>> {
    requests
        .iter()
        .map(|request| {
            let product = catalog.require(request.product_id)?;
            Ok(ResolvedLine {
                product: product.snapshot(),
                quantity: request.quantity,
            })
        })
        .collect()
}

/// Distinct product ids referenced by a request, in first-seen order.
///
/// This is the key set for the batch lookup that feeds the catalog.
pub fn referenced_product_ids(requests: &[OrderLineRequest]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = Vec::with_capacity(requests.len());
    for request in requests {
        if !ids.contains(&request.product_id) {
            ids.push(request.product_id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{Product, ProductType, ProductTypeId};
    use rust_decimal_macros::dec;

    fn merch() -> ProductType {
        ProductType::new(ProductTypeId::new(1), "Merchandise").unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new(ProductId::new(1), "Iron Man Cup", merch(), 10, dec!(25.00)).unwrap(),
            Product::new(ProductId::new(2), "Captain America Shield", merch(), 3, dec!(99.90)).unwrap(),
        ])
    }

    #[test]
    fn test_resolves_in_request_order() {
        let requests = vec![
            OrderLineRequest::new(ProductId::new(2), 1),
            OrderLineRequest::new(ProductId::new(1), 3),
        ];

        let lines = resolve_lines(&requests, &catalog()).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product.name(), "Captain America Shield");
        assert_eq!(lines[1].product.price(), dec!(25.00));
        assert_eq!(lines[1].quantity, 3);
    }

    #[test]
    fn test_missing_product_fails_fast() {
        let requests = vec![
            OrderLineRequest::new(ProductId::new(1), 3),
            OrderLineRequest::new(ProductId::new(99), 1),
            OrderLineRequest::new(ProductId::new(42), 1),
        ];

        let err = resolve_lines(&requests, &catalog()).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(id) if id == ProductId::new(99)));
    }

    #[test]
    fn test_referenced_ids_are_distinct() {
        let requests = vec![
            OrderLineRequest::new(ProductId::new(4), 1),
            OrderLineRequest::new(ProductId::new(1), 2),
            OrderLineRequest::new(ProductId::new(4), 5),
        ];

        assert_eq!(
            referenced_product_ids(&requests),
            vec![ProductId::new(4), ProductId::new(1)]
        );
    }
}
