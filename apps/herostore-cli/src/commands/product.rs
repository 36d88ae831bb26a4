//! # Product Commands
//!
//! Catalog listing filtered by stock condition, and single-product
//! maintenance.
//!
//! ```text
//! product create ─► product type lookup ── missing ──► 404
//!                        │
//!                        ▼
//!                   Product::new ───────── invalid ──► 422
//!                        │
//!                        ▼
//!                   insert ─────────────── id taken ─► 409
//! ```

use std::time::Instant;

use tracing::{debug, info};

use herostore_core::{Product, ProductId, StockCondition};
use herostore_db::Database;

use super::product_type::find_product_type;
use crate::dto::{DeletedDto, ProductDto, ProductRequest};
use crate::error::ApiError;

/// Lists products matching `condition`, ordered by id.
pub async fn list_products(db: &Database, condition: StockCondition) -> Result<Vec<ProductDto>, ApiError> {
    let start = Instant::now();

    let products = db.products().list(condition).await?;

    debug!(
        condition = condition.as_str(),
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Listed products"
    );

    Ok(products.into_iter().map(ProductDto::from).collect())
}

async fn find_product(db: &Database, id: i64) -> Result<Product, ApiError> {
    db.products()
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found for id {}", id)))
}

pub async fn get_product(db: &Database, id: i64) -> Result<ProductDto, ApiError> {
    Ok(ProductDto::from(find_product(db, id).await?))
}

/// Creates a product. Without an id in the request the next free id is used.
pub async fn create_product(db: &Database, request: &ProductRequest) -> Result<ProductDto, ApiError> {
    let product_type = find_product_type(db, request.product_type_id).await?;
    let id = match request.id {
        Some(id) => ProductId::new(id),
        None => db.products().next_id().await?,
    };

    let product = Product::new(id, &request.name, product_type, request.stock, request.price)?;
    db.products().insert(&product).await?;

    info!(product_id = %product.id(), name = %product.name(), "Product created");
    Ok(ProductDto::from(product))
}

/// Replaces name, type, stock and price of an existing product.
///
/// The id in the request body, if any, is ignored.
pub async fn update_product(db: &Database, id: i64, request: &ProductRequest) -> Result<ProductDto, ApiError> {
    let existing = find_product(db, id).await?;
    let product_type = find_product_type(db, request.product_type_id).await?;

    let product = Product::new(existing.id(), &request.name, product_type, request.stock, request.price)?;
    db.products().update(&product).await?;

    info!(product_id = %product.id(), "Product updated");
    Ok(ProductDto::from(product))
}

pub async fn delete_product(db: &Database, id: i64) -> Result<DeletedDto, ApiError> {
    let product = find_product(db, id).await?;
    db.products().delete(product.id()).await?;

    info!(product_id = %product.id(), "Product deleted");
    Ok(DeletedDto {
        entity: "Product".to_string(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn request(id: Option<i64>, name: &str, product_type_id: i64, stock: i64) -> ProductRequest {
        ProductRequest {
            id,
            name: name.to_string(),
            product_type_id,
            stock,
            price: dec!(19.90),
        }
    }

    #[tokio::test]
    async fn test_list_by_condition() {
        let db = test_support::database().await;

        let all = list_products(&db, StockCondition::All).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(all[0].product_type_name, "Mugs");

        let available = list_products(&db, StockCondition::Available).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Iron Man Cup");
        assert!(available[0].available);

        let unavailable = list_products(&db, StockCondition::Unavailable).await.unwrap();
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].stock, 0);
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let db = test_support::database().await;

        let created = create_product(&db, &request(None, "Thor Mug", 1, 4)).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(created.product_type.name, "Mugs");

        let fetched = get_product(&db, 4).await.unwrap();
        assert_eq!(fetched.name, "Thor Mug");
        assert_eq!(fetched.price, dec!(19.90));

        let updated = update_product(&db, 4, &request(Some(99), "Thor Stein", 1, 0)).await.unwrap();
        assert_eq!(updated.id, 4);
        assert!(!updated.available);

        let deleted = delete_product(&db, 4).await.unwrap();
        assert_eq!(deleted.entity, "Product");
        let err = get_product(&db, 4).await.unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Product not found for id 4"));
    }

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let db = test_support::database().await;

        let created = create_product(&db, &request(Some(20), "Loki Mug", 1, 2)).await.unwrap();
        assert_eq!(created.id, 20);

        let err = create_product(&db, &request(Some(20), "Loki Mug", 1, 2)).await.unwrap_err();
        assert_eq!(err.error, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_unknown_product_type() {
        let db = test_support::database().await;

        let err = create_product(&db, &request(None, "Thor Mug", 7, 4)).await.unwrap_err();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message.as_deref(), Some("Product type not found for id 7"));
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected() {
        let db = test_support::database().await;

        let err = create_product(&db, &request(None, " ", 1, -1)).await.unwrap_err();
        assert_eq!(err.status_code, 422);
        let fields: Vec<_> = err
            .field_validation_errors
            .unwrap()
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(fields, vec!["name", "stock"]);
        assert_eq!(db.products().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let db = test_support::database().await;

        assert_eq!(update_product(&db, 9, &request(None, "Ghost", 1, 1)).await.unwrap_err().status_code, 404);
        assert_eq!(delete_product(&db, 9).await.unwrap_err().status_code, 404);
    }
}
