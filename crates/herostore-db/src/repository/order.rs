//! # Order Repository
//!
//! Storage of registered orders and their lines.
//!
//! Orders are written only by the registration service, inside its
//! transaction. Reads rebuild the aggregate through the same constructors
//! that created it, so a row whose totals no longer add up is reported as
//! corrupt instead of being returned.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use herostore_core::{LineItem, Order, OrderLine, ProductId, ProductSnapshot};

use super::{parse_decimal, parse_money};
use crate::error::{DbError, DbResult};

const SELECT_LINE: &str = r#"
    SELECT id, order_id, line_number, product_id, product_name, product_price, quantity, total
    FROM order_lines
"#;

/// Repository for reading orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its lines.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Order found
    /// * `Ok(None)` - Order not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query("SELECT id, total, created_at FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_rows = sqlx::query(&format!("{SELECT_LINE} WHERE order_id = ?1 ORDER BY line_number"))
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let lines = line_rows.iter().map(line_from_row).collect::<DbResult<Vec<_>>>()?;
        order_from_row(&row, lines).map(Some)
    }

    /// Lists every order, newest first.
    ///
    /// Two queries regardless of the number of orders:
    /// ```text
    /// SELECT ... FROM orders ORDER BY created_at DESC
    /// SELECT ... FROM order_lines ORDER BY order_id, line_number
    ///       │
    ///       ▼
    /// lines grouped by order_id, attached to each order
    /// ```
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let order_rows = sqlx::query("SELECT id, total, created_at FROM orders ORDER BY created_at DESC, id")
            .fetch_all(&self.pool)
            .await?;

        let line_rows = sqlx::query(&format!("{SELECT_LINE} ORDER BY order_id, line_number"))
            .fetch_all(&self.pool)
            .await?;

        let mut lines_by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for row in &line_rows {
            let order_id: String = row.try_get("order_id")?;
            lines_by_order.entry(order_id).or_default().push(line_from_row(row)?);
        }

        let orders = order_rows
            .iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let lines = lines_by_order.remove(&id).unwrap_or_default();
                order_from_row(row, lines)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = orders.len(), "Loaded orders");
        Ok(orders)
    }

    /// Counts stored orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level operations (used inside the registration transaction)
// =============================================================================

/// Inserts an order and all of its lines.
pub(crate) async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(id = %order.id(), lines = order.line_count(), "Inserting order");

    sqlx::query("INSERT INTO orders (id, total, created_at) VALUES (?1, ?2, ?3)")
        .bind(order.id())
        .bind(order.total().amount().to_string())
        .bind(order.created_at())
        .execute(&mut *conn)
        .await?;

    for line in order.lines() {
        sqlx::query(
            r#"
            INSERT INTO order_lines (
                id, order_id, line_number, product_id,
                product_name, product_price, quantity, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(line.id())
        .bind(order.id())
        .bind(line.line_number())
        .bind(line.product().id().value())
        .bind(line.product().name())
        .bind(line.product().price().to_string())
        .bind(line.quantity())
        .bind(line.total().amount().to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

fn line_from_row(row: &SqliteRow) -> DbResult<OrderLine> {
    let id: String = row.try_get("id")?;
    let line_number: u32 = row.try_get("line_number")?;
    let product_id: i64 = row.try_get("product_id")?;
    let product_name: String = row.try_get("product_name")?;
    let price_text: String = row.try_get("product_price")?;
    let quantity: i64 = row.try_get("quantity")?;
    let total_text: String = row.try_get("total")?;

    let price = parse_decimal("OrderLine", &id, "product_price", &price_text)?;
    let total = parse_money("OrderLine", &id, "total", &total_text)?;

    let snapshot = ProductSnapshot::new(ProductId::new(product_id), product_name, price)
        .map_err(|e| DbError::corrupt("OrderLine", &id, e))?;

    OrderLine::new(id.clone(), line_number, snapshot, quantity, total)
        .map_err(|e| DbError::corrupt("OrderLine", &id, e))
}

fn order_from_row(row: &SqliteRow, lines: Vec<OrderLine>) -> DbResult<Order> {
    let id: String = row.try_get("id")?;
    let total_text: String = row.try_get("total")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    let total = parse_money("Order", &id, "total", &total_text)?;

    Order::new(id.clone(), lines, created_at, total).map_err(|e| DbError::corrupt("Order", &id, e))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use herostore_core::Money;
    use rust_decimal_macros::dec;

    fn order(id: &str, hour: u32) -> Order {
        let cup = ProductSnapshot::new(ProductId::new(1), "Iron Man Cup", dec!(25.00)).unwrap();
        let keychain = ProductSnapshot::new(ProductId::new(7), "Thor Hammer Keychain", dec!(15.255)).unwrap();
        let lines = vec![
            OrderLine::new(format!("{id}-1"), 1, cup, 3, Money::from_cents(7500)).unwrap(),
            OrderLine::new(format!("{id}-2"), 2, keychain, 2, Money::from_cents(3051)).unwrap(),
        ];
        let created_at = Utc.with_ymd_and_hms(2024, 5, 4, hour, 0, 0).unwrap();
        Order::assemble(id, lines, created_at).unwrap()
    }

    async fn store(db: &Database, order: &Order) {
        let mut conn = db.pool().acquire().await.unwrap();
        insert_order(&mut conn, order).await.unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_keeps_snapshot_precision() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let original = order("o-1", 10);
        store(&db, &original).await;

        let loaded = db.orders().get_by_id("o-1").await.unwrap().unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.lines()[1].product().price(), dec!(15.255));
        assert_eq!(loaded.total(), Money::from_cents(10551));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        store(&db, &order("early", 9)).await;
        store(&db, &order("late", 18)).await;

        let orders = db.orders().list().await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec!["late", "early"]);
        assert!(orders.iter().all(|o| o.line_count() == 2));

        assert_eq!(db.orders().count().await.unwrap(), 2);
        assert!(db.orders().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tampered_total_is_corrupt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        store(&db, &order("o-1", 10)).await;

        sqlx::query("UPDATE orders SET total = '1.00' WHERE id = 'o-1'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.orders().get_by_id("o-1").await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRow { ref entity, .. } if entity == "Order"));
    }
}
