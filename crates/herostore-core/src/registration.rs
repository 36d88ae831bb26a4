//! # Registration Pipeline
//!
//! The pure part of registering an order. Storage loads the products and
//! persists the result; everything in between happens here.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReceiveRequest                                                         │
//! │       │ validate_order_request        ──► InvalidRequest (field-tagged) │
//! │       ▼                                                                 │
//! │  LookupProducts (caller, batch by id)                                   │
//! │       │ Catalog::from_products                                          │
//! │       ▼                                                                 │
//! │  ResolveLines                         ──► ProductNotFound (fail-fast)   │
//! │       ▼                                                                 │
//! │  ReconcileStock                       ──► InvalidOrder (batched)        │
//! │       ▼                                                                 │
//! │  BuildAggregate                       ──► InvalidEntityState            │
//! │       ▼                                                                 │
//! │  Registration { order, movements, products }                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PersistProductsAndOrder (caller, one transaction)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every arrow out is terminal. Nothing is returned for the caller to
//! persist unless every stage succeeded.

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::error::CoreResult;
use crate::order::{build_order, IdGenerator, Order, OrderLine};
use crate::reconciler::{reconcile_stock, StockMovement};
use crate::resolver::resolve_lines;
use crate::types::{OrderLineRequest, Product};
use crate::validation::validate_order_request;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    /// The new order.
    pub order: Order<OrderLine>,
    /// One stock decrement per order line, in line order.
    pub movements: Vec<StockMovement>,
    /// Products whose stock changed, with their new stock.
    pub products: Vec<Product>,
}

/// Runs the registration pipeline over an already loaded product set.
///
/// `products` is the batch lookup result for the referenced ids; it may be
/// missing ids (those fail with `ProductNotFound`).
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use herostore_core::order::{LineItem, UuidGenerator};
/// use herostore_core::registration::register;
/// use herostore_core::types::{OrderLineRequest, Product, ProductId, ProductType, ProductTypeId};
/// use herostore_core::Money;
/// use rust_decimal::Decimal;
///
/// let mugs = ProductType::new(ProductTypeId::new(1), "Mugs").unwrap();
/// let cup = Product::new(ProductId::new(1), "Iron Man Cup", mugs, 10, Decimal::new(2500, 2)).unwrap();
/// let request = [OrderLineRequest::new(ProductId::new(1), 3)];
///
/// let registration = register(&request, vec![cup], &mut UuidGenerator, Utc::now()).unwrap();
///
/// assert_eq!(registration.order.total(), Money::from_cents(7500));
/// assert_eq!(registration.products[0].stock(), 7);
/// ```
pub fn register<G>(
    requests: &[OrderLineRequest],
    products: Vec<Product>,
    ids: &mut G,
    created_at: DateTime<Utc>,
) -> CoreResult<Registration>
where
    G: IdGenerator + ?Sized,
{
    validate_order_request(requests)?;

    let mut catalog = Catalog::from_products(products);
    let resolved = resolve_lines(requests, &catalog)?;
    let movements = reconcile_stock(&resolved, &mut catalog)?;
    let order = build_order(&resolved, ids, created_at)?;

    let mut touched = Vec::new();
    for movement in &movements {
        if !touched.contains(&movement.product_id) {
            touched.push(movement.product_id);
        }
    }
    let products = touched
        .into_iter()
        .filter_map(|id| catalog.get(id).cloned())
        .collect();

    Ok(Registration {
        order,
        movements,
        products,
    })
}
