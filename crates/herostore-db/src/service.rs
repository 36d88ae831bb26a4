//! # Order Registration Service
//!
//! Runs the core registration pipeline against SQLite as a single unit.
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_order([{1, 3}, {7, 2}])                                       │
//! │       │                                                                 │
//! │       │ validate_order_request           (no transaction yet)          │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE ───────────────────────────────────────────────┐      │
//! │  │ SELECT ... FROM products WHERE id IN (1, 7)                  │      │
//! │  │ herostore_core::register(..)     resolve/reconcile/build     │      │
//! │  │ UPDATE products SET stock = stock - 3 WHERE id=1 AND stock=10│      │
//! │  │ UPDATE products SET stock = stock - 2 WHERE id=7 AND stock=4 │      │
//! │  │ INSERT INTO orders ...                                       │      │
//! │  │ INSERT INTO order_lines ... × 2                              │      │
//! │  COMMIT ────────────────────────────────────────────────────────┘      │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction → ROLLBACK.             │
//! │  Either the stock changes and the order are both written, or neither.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrent Registrations
//! The transaction takes SQLite's write lock before it reads stock. A second
//! registration waits (up to the busy timeout) at `BEGIN IMMEDIATE`, then
//! reads the stock the first one committed. Losing a race therefore shows up
//! as an ordinary `InvalidOrder`. `StaleStock` and `Busy` remain for writers
//! outside this service and for lock waits that time out.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use herostore_core::resolver::referenced_product_ids;
use herostore_core::validation::validate_order_request;
use herostore_core::{register, CoreError, LineItem, Order, OrderLineRequest, UuidGenerator};

use crate::error::DbError;
use crate::repository::order::{insert_order, OrderRepository};
use crate::repository::product::{apply_movement, fetch_by_ids};

// =============================================================================
// Service Error
// =============================================================================

/// Failure of a service operation: either a business rule or storage.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(err.into())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Order Service
// =============================================================================

/// Order registration and retrieval.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    /// Registers an order, decrementing stock for every line.
    ///
    /// ## Returns
    /// * `Ok(Order)` - order and stock changes committed
    /// * `Err(Core(InvalidRequest))` - empty request or bad quantity
    /// * `Err(Core(ProductNotFound))` - first unknown product id
    /// * `Err(Core(InvalidOrder))` - every line short on stock
    /// * `Err(Db(StaleStock))` - stock changed under the transaction
    /// * `Err(Db(Busy))` - the write lock was not granted within the busy timeout
    /// * `Err(Db(..))` - storage failure
    ///
    /// Nothing is written on any error.
    pub async fn register_order(&self, requests: &[OrderLineRequest]) -> ServiceResult<Order> {
        info!(lines = requests.len(), "Registering order");

        validate_order_request(requests)?;

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let ids = referenced_product_ids(requests);
        let products = fetch_by_ids(&mut tx, &ids).await?;

        let registration = match register(requests, products, &mut UuidGenerator, Utc::now()) {
            Ok(registration) => registration,
            Err(err) => {
                log_rejection(&err);
                return Err(err.into());
            }
        };

        for movement in &registration.movements {
            apply_movement(&mut tx, movement).await?;
        }
        insert_order(&mut tx, &registration.order).await?;

        tx.commit().await?;

        let order = registration.order;
        info!(
            order_id = %order.id(),
            lines = order.line_count(),
            total = %order.total(),
            "Order registered"
        );
        Ok(order)
    }

    /// Lists every registered order, newest first.
    pub async fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.orders().list().await?)
    }

    /// Gets one order.
    ///
    /// ## Errors
    /// `Db(NotFound)` if no order has this id.
    pub async fn get_order(&self, id: &str) -> ServiceResult<Order> {
        self.orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id).into())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }
}

fn log_rejection(err: &CoreError) {
    match err {
        CoreError::InvalidOrder(lines) => {
            warn!(invalid_lines = lines.len(), "Order rejected: insufficient stock");
        }
        CoreError::ProductNotFound(id) => {
            debug!(product_id = %id, "Order rejected: unknown product");
        }
        other => {
            debug!(error = %other, "Order rejected");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use herostore_core::{Money, Product, ProductId, ProductType, ProductTypeId};
    use rust_decimal_macros::dec;

    async fn database() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mugs = ProductType::new(ProductTypeId::new(1), "Mugs").unwrap();
        db.product_types().insert(&mugs).await.unwrap();
        db.products()
            .insert(&Product::new(ProductId::new(1), "Iron Man Cup", mugs, 10, dec!(25.00)).unwrap())
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_register_and_fetch() {
        let db = database().await;
        let service = db.order_service();

        let order = service
            .register_order(&[OrderLineRequest::new(ProductId::new(1), 3)])
            .await
            .unwrap();
        assert_eq!(order.total(), Money::from_cents(7500));

        let fetched = service.get_order(order.id()).await.unwrap();
        assert_eq!(fetched, order);
        assert_eq!(service.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let db = database().await;
        let err = db.order_service().get_order("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_request_never_opens_a_transaction() {
        let db = database().await;
        let err = db.order_service().register_order(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InvalidRequest(_))));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }
}
