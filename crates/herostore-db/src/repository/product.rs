//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Batch lookup by ids (feeds the registration catalog)
//! - Listing filtered by stock condition
//! - CRUD operations (every product row carries its product type)
//! - Guarded stock decrements
//!
//! ## Guarded Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: Absolute update (lost update under concurrency)         │
//! │     UPDATE products SET stock = 7 WHERE id = 1                     │
//! │                                                                     │
//! │  ✅ CORRECT: Delta update guarded by the stock we checked          │
//! │     UPDATE products SET stock = stock - 3                          │
//! │     WHERE id = 1 AND stock = 10                                    │
//! │                                                                     │
//! │  Registration A read 10, registration B read 10:                   │
//! │    A: 10 → 7   (1 row)                                             │
//! │    B: stock is 7, not 10 → 0 rows → StaleStock, B rolls back       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use herostore_core::{Product, ProductId, ProductType, ProductTypeId, StockCondition, StockMovement};

use super::parse_decimal;
use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = "SELECT p.id, p.name, p.stock, p.price, t.id AS type_id, t.name AS type_name \
     FROM products p JOIN product_types t ON t.id = p.product_type_id";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let available = repo.list(StockCondition::Available).await?;
/// let cup = repo.get_by_id(ProductId::new(1)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        let row = sqlx::query(&format!("{SELECT_PRODUCT} WHERE p.id = ?1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Loads every product whose id is in `ids`, in id order.
    ///
    /// Ids with no product are simply absent from the result.
    pub async fn find_by_ids(&self, ids: &[ProductId]) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_ids(&mut conn, ids).await
    }

    /// Lists products matching a stock condition, in id order.
    ///
    /// ```text
    /// All          every product
    /// Available    stock > 0
    /// Unavailable  stock = 0
    /// ```
    pub async fn list(&self, condition: StockCondition) -> DbResult<Vec<Product>> {
        debug!(condition = condition.as_str(), "Listing products");

        let filter = match condition {
            StockCondition::All => "",
            StockCondition::Available => " WHERE p.stock > 0",
            StockCondition::Unavailable => " WHERE p.stock = 0",
        };

        let rows = sqlx::query(&format!("{SELECT_PRODUCT}{filter} ORDER BY p.id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Lists the products of one type, in id order.
    pub async fn list_by_type(&self, product_type: ProductTypeId) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(&format!("{SELECT_PRODUCT} WHERE t.id = ?1 ORDER BY p.id"))
            .bind(product_type.value())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - id already exists
    /// * `Err(DbError::ForeignKeyViolation)` - product type doesn't exist
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id(), name = %product.name(), "Inserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, product_type_id, stock, price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(product.id().value())
        .bind(product.name())
        .bind(product.product_type().id().value())
        .bind(product.stock())
        .bind(product.price().to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, product.id()),
            other => other,
        })?;

        Ok(())
    }

    /// Updates name, type, stock and price of an existing product.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id(), "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                product_type_id = ?3,
                stock = ?4,
                price = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(product.id().value())
        .bind(product.name())
        .bind(product.product_type().id().value())
        .bind(product.stock())
        .bind(product.price().to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id()));
        }

        Ok(())
    }

    /// Deletes a product. Existing order lines keep their snapshot.
    pub async fn delete(&self, id: ProductId) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// One past the highest product id, for products created without an id.
    pub async fn next_id(&self) -> DbResult<ProductId> {
        let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(ProductId::new(next))
    }
}

// =============================================================================
// Connection-level operations (used inside the registration transaction)
// =============================================================================

/// Batch lookup by ids on an existing connection or transaction.
pub(crate) async fn fetch_by_ids(conn: &mut SqliteConnection, ids: &[ProductId]) -> DbResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{SELECT_PRODUCT} WHERE p.id IN ({placeholders}) ORDER BY p.id");

    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id.value());
    }

    let rows = query.fetch_all(&mut *conn).await?;
    debug!(requested = ids.len(), found = rows.len(), "Batch loaded products");

    rows.iter().map(product_from_row).collect()
}

/// Applies one stock movement as a guarded delta.
///
/// ## Returns
/// * `Ok(())` - stock went from `previous_stock` to `new_stock`
/// * `Err(DbError::StaleStock)` - the row no longer has `previous_stock`
pub(crate) async fn apply_movement(conn: &mut SqliteConnection, movement: &StockMovement) -> DbResult<()> {
    debug!(
        id = %movement.product_id,
        requested = movement.requested,
        previous = movement.previous_stock,
        "Decrementing stock"
    );

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock = ?4
        "#,
    )
    .bind(movement.product_id.value())
    .bind(movement.requested)
    .bind(Utc::now())
    .bind(movement.previous_stock)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::StaleStock {
            product_id: movement.product_id.value(),
            expected: movement.previous_stock,
        });
    }

    Ok(())
}

fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let stock: i64 = row.try_get("stock")?;
    let price_text: String = row.try_get("price")?;
    let price = parse_decimal("Product", id, "price", &price_text)?;

    let type_id: i64 = row.try_get("type_id")?;
    let type_name: String = row.try_get("type_name")?;
    let product_type = ProductType::new(ProductTypeId::new(type_id), type_name)
        .map_err(|e| DbError::corrupt("ProductType", type_id, e))?;

    Product::new(ProductId::new(id), name, product_type, stock, price).map_err(|e| DbError::corrupt("Product", id, e))
}

// =============================================================================
// Unit Tests
// =============================================================================
