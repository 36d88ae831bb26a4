//! # Product Type Repository
//!
//! Database operations for product types.
//!
//! Deleting a product type deletes its products (`ON DELETE CASCADE`).
//! Order lines are not affected; they keep their product snapshot.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use herostore_core::{ProductType, ProductTypeId};

use crate::error::{DbError, DbResult};

/// Repository for product type database operations.
#[derive(Debug, Clone)]
pub struct ProductTypeRepository {
    pool: SqlitePool,
}

impl ProductTypeRepository {
    /// Creates a new ProductTypeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductTypeRepository { pool }
    }

    /// Gets a product type by its ID.
    pub async fn get_by_id(&self, id: ProductTypeId) -> DbResult<Option<ProductType>> {
        let row = sqlx::query("SELECT id, name FROM product_types WHERE id = ?1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_type_from_row).transpose()
    }

    /// Lists every product type, in id order.
    pub async fn list(&self) -> DbResult<Vec<ProductType>> {
        let rows = sqlx::query("SELECT id, name FROM product_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(product_type_from_row).collect()
    }

    /// Inserts a new product type.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - id already exists
    pub async fn insert(&self, product_type: &ProductType) -> DbResult<()> {
        debug!(id = %product_type.id(), name = %product_type.name(), "Inserting product type");

        sqlx::query(
            r#"
            INSERT INTO product_types (id, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(product_type.id().value())
        .bind(product_type.name())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, product_type.id()),
            other => other,
        })?;

        Ok(())
    }

    /// Renames an existing product type.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product type doesn't exist
    pub async fn update(&self, product_type: &ProductType) -> DbResult<()> {
        debug!(id = %product_type.id(), "Updating product type");

        let result = sqlx::query("UPDATE product_types SET name = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(product_type.id().value())
            .bind(product_type.name())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductType", product_type.id()));
        }

        Ok(())
    }

    /// Deletes a product type together with its products.
    pub async fn delete(&self, id: ProductTypeId) -> DbResult<()> {
        debug!(id = %id, "Deleting product type");

        let result = sqlx::query("DELETE FROM product_types WHERE id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductType", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_types")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// One past the highest product type id.
    pub async fn next_id(&self) -> DbResult<ProductTypeId> {
        let next: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM product_types")
            .fetch_one(&self.pool)
            .await?;

        Ok(ProductTypeId::new(next))
    }
}

fn product_type_from_row(row: &SqliteRow) -> DbResult<ProductType> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;

    ProductType::new(ProductTypeId::new(id), name).map_err(|e| DbError::corrupt("ProductType", id, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use herostore_core::{Product, ProductId};
    use rust_decimal_macros::dec;

    fn kind(id: i64, name: &str) -> ProductType {
        ProductType::new(ProductTypeId::new(id), name).unwrap()
    }

    #[tokio::test]
    async fn test_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.product_types();

        assert_eq!(repo.next_id().await.unwrap(), ProductTypeId::new(1));
        repo.insert(&kind(1, "Mugs")).await.unwrap();
        repo.insert(&kind(2, "Posters")).await.unwrap();
        assert_eq!(repo.next_id().await.unwrap(), ProductTypeId::new(3));

        let mut mugs = repo.get_by_id(ProductTypeId::new(1)).await.unwrap().unwrap();
        mugs.rename("Mugs & Cups").unwrap();
        repo.update(&mugs).await.unwrap();

        let names: Vec<_> = repo.list().await.unwrap().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["Mugs & Cups", "Posters"]);

        repo.delete(ProductTypeId::new(2)).await.unwrap();
        assert!(repo.get_by_id(ProductTypeId::new(2)).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_and_duplicate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.product_types();
        repo.insert(&kind(1, "Mugs")).await.unwrap();

        assert!(matches!(
            repo.insert(&kind(1, "Cups")).await,
            Err(DbError::UniqueViolation { ref value, .. }) if value == "1"
        ));
        assert!(matches!(repo.update(&kind(9, "Ghosts")).await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.delete(ProductTypeId::new(9)).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_its_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mugs = kind(1, "Mugs");
        db.product_types().insert(&mugs).await.unwrap();
        db.products()
            .insert(&Product::new(ProductId::new(1), "Iron Man Cup", mugs, 10, dec!(25.00)).unwrap())
            .await
            .unwrap();

        db.product_types().delete(ProductTypeId::new(1)).await.unwrap();

        assert_eq!(db.products().count().await.unwrap(), 0);
    }
}
