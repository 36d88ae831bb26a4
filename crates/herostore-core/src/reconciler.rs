//! # Stock Reconciler
//!
//! Checks every resolved line against current stock and decrements it.
//!
//! ## Failure Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog: Cup(stock 10), Shield(stock 3), Mug(stock 0)                  │
//! │                                                                         │
//! │  line 1: Cup × 4     ok    scratch Cup 10 → 6                           │
//! │  line 2: Shield × 5  FAIL  {id 2, "Shield", requested 5, stock 3}       │
//! │  line 3: Mug × 1     FAIL  {id 3, "Mug", requested 1, stock 0}          │
//! │                                                                         │
//! │  → InvalidOrder([line 2, line 3])                                       │
//! │  → scratch dropped, Catalog still has Cup(stock 10)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every line is checked even after a failure so the caller can correct all
//! quantities at once. Decrements happen on a scratch copy of the catalog
//! and are committed only when no line failed.
//!
//! Lines naming the same product are checked cumulatively: the second line
//! sees the stock left by the first.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::resolver::ResolvedLine;
use crate::types::ProductId;

/// One line that asked for more than the available stock.
///
/// `stock` is the stock the line was checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidOrderLine {
    pub id: ProductId,
    pub name: String,
    pub requested_quantity: i64,
    pub stock: i64,
}

/// A stock decrement applied to one product for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub product_id: ProductId,
    pub requested: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
}

/// Validates and applies stock decrements for all lines.
///
/// ## Returns
/// * `Ok(movements)` - one movement per line, catalog updated
/// * `Err(InvalidOrder)` - one entry per short line, catalog untouched
/// * `Err(ProductNotFound)` - a line's product is missing from the catalog
pub fn reconcile_stock(lines: &[ResolvedLine], catalog: &mut Catalog) -> CoreResult<Vec<StockMovement>> {
    let mut scratch = catalog.clone();
    let mut movements = Vec::with_capacity(lines.len());
    let mut failures = Vec::new();

    for line in lines {
        let product_id = line.product.id();
        let product = scratch
            .get_mut(product_id)
            .ok_or(CoreError::ProductNotFound(product_id))?;

        let previous_stock = product.stock();
        if line.quantity > previous_stock {
            failures.push(InvalidOrderLine {
                id: product_id,
                name: product.name().to_string(),
                requested_quantity: line.quantity,
                stock: previous_stock,
            });
            continue;
        }

        product.remove_from_stock(line.quantity)?;
        movements.push(StockMovement {
            product_id,
            requested: line.quantity,
            previous_stock,
            new_stock: product.stock(),
        });
    }

    if !failures.is_empty() {
        return Err(CoreError::InvalidOrder(failures));
    }

    *catalog = scratch;
    Ok(movements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_lines;
    use crate::types::{OrderLineRequest, Product, ProductType, ProductTypeId};
    use rust_decimal_macros::dec;

    fn merch() -> ProductType {
        ProductType::new(ProductTypeId::new(1), "Merchandise").unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new(ProductId::new(1), "Iron Man Cup", merch(), 10, dec!(25.00)).unwrap(),
            Product::new(ProductId::new(2), "Captain America Shield", merch(), 3, dec!(99.90)).unwrap(),
            Product::new(ProductId::new(3), "Hulk Mug", merch(), 0, dec!(12.50)).unwrap(),
        ])
    }

    fn resolve(catalog: &Catalog, requests: &[(i64, i64)]) -> Vec<ResolvedLine> {
        let requests: Vec<_> = requests
            .iter()
            .map(|&(id, qty)| OrderLineRequest::new(ProductId::new(id), qty))
            .collect();
        resolve_lines(&requests, catalog).unwrap()
    }

    fn stock(catalog: &Catalog, id: i64) -> i64 {
        catalog.get(ProductId::new(id)).unwrap().stock()
    }

    #[test]
    fn test_decrements_stock() {
        let mut catalog = catalog();
        let lines = resolve(&catalog, &[(1, 3)]);

        let movements = reconcile_stock(&lines, &mut catalog).unwrap();

        assert_eq!(
            movements,
            vec![StockMovement {
                product_id: ProductId::new(1),
                requested: 3,
                previous_stock: 10,
                new_stock: 7,
            }]
        );
        assert_eq!(stock(&catalog, 1), 7);
    }

    #[test]
    fn test_single_short_line() {
        let mut catalog = catalog();
        let lines = resolve(&catalog, &[(1, 20)]);

        let err = reconcile_stock(&lines, &mut catalog).unwrap_err();

        match err {
            CoreError::InvalidOrder(failures) => assert_eq!(
                failures,
                vec![InvalidOrderLine {
                    id: ProductId::new(1),
                    name: "Iron Man Cup".to_string(),
                    requested_quantity: 20,
                    stock: 10,
                }]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock(&catalog, 1), 10);
    }

    #[test]
    fn test_failures_are_batched_and_nothing_commits() {
        let mut catalog = catalog();
        let lines = resolve(&catalog, &[(1, 4), (2, 5), (3, 1)]);

        let err = reconcile_stock(&lines, &mut catalog).unwrap_err();

        match err {
            CoreError::InvalidOrder(failures) => {
                let ids: Vec<_> = failures.iter().map(|f| f.id.value()).collect();
                assert_eq!(ids, vec![2, 3]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The valid line's decrement was discarded too
        assert_eq!(stock(&catalog, 1), 10);
    }

    #[test]
    fn test_duplicate_products_are_cumulative() {
        let mut catalog = catalog();
        let lines = resolve(&catalog, &[(1, 6), (1, 4)]);

        let movements = reconcile_stock(&lines, &mut catalog).unwrap();

        assert_eq!(movements[1].previous_stock, 4);
        assert_eq!(movements[1].new_stock, 0);
        assert_eq!(stock(&catalog, 1), 0);
    }

    #[test]
    fn test_duplicate_products_over_stock() {
        let mut catalog = catalog();
        let lines = resolve(&catalog, &[(1, 6), (1, 5)]);

        match reconcile_stock(&lines, &mut catalog).unwrap_err() {
            CoreError::InvalidOrder(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].requested_quantity, 5);
                assert_eq!(failures[0].stock, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock(&catalog, 1), 10);
    }

    #[test]
    fn test_invalid_line_json() {
        let line = InvalidOrderLine {
            id: ProductId::new(1),
            name: "Iron Man Cup".to_string(),
            requested_quantity: 20,
            stock: 10,
        };
        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            serde_json::json!({"id": 1, "name": "Iron Man Cup", "requestedQuantity": 20, "stock": 10})
        );
    }
}
