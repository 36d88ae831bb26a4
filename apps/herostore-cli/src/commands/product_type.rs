//! # Product Type Commands
//!
//! Deleting a product type also deletes every product of that type.

use tracing::{info, warn};

use herostore_core::{ProductType, ProductTypeId};
use herostore_db::Database;

use crate::dto::{DeletedDto, ProductTypeDto, ProductTypeRequest};
use crate::error::ApiError;

/// Loads a product type, or fails with `404 Resource Not Found`.
pub(crate) async fn find_product_type(db: &Database, id: i64) -> Result<ProductType, ApiError> {
    db.product_types()
        .get_by_id(ProductTypeId::new(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product type not found for id {}", id)))
}

pub async fn list_product_types(db: &Database) -> Result<Vec<ProductTypeDto>, ApiError> {
    let types = db.product_types().list().await?;
    Ok(types.iter().map(ProductTypeDto::from).collect())
}

pub async fn get_product_type(db: &Database, id: i64) -> Result<ProductTypeDto, ApiError> {
    Ok(ProductTypeDto::from(&find_product_type(db, id).await?))
}

/// Creates a product type. Without an id in the request the next free id is used.
pub async fn create_product_type(db: &Database, request: &ProductTypeRequest) -> Result<ProductTypeDto, ApiError> {
    let id = match request.id {
        Some(id) => ProductTypeId::new(id),
        None => db.product_types().next_id().await?,
    };

    let product_type = ProductType::new(id, &request.name)?;
    db.product_types().insert(&product_type).await?;

    info!(product_type_id = %product_type.id(), name = %product_type.name(), "Product type created");
    Ok(ProductTypeDto::from(&product_type))
}

pub async fn update_product_type(
    db: &Database,
    id: i64,
    request: &ProductTypeRequest,
) -> Result<ProductTypeDto, ApiError> {
    let mut product_type = find_product_type(db, id).await?;
    product_type.rename(&request.name)?;
    db.product_types().update(&product_type).await?;

    info!(product_type_id = %product_type.id(), "Product type renamed");
    Ok(ProductTypeDto::from(&product_type))
}

pub async fn delete_product_type(db: &Database, id: i64) -> Result<DeletedDto, ApiError> {
    let product_type = find_product_type(db, id).await?;
    let products = db.products().list_by_type(product_type.id()).await?;

    db.product_types().delete(product_type.id()).await?;

    if !products.is_empty() {
        warn!(
            product_type_id = %product_type.id(),
            products = products.len(),
            "Deleted products along with their type"
        );
    }
    info!(product_type_id = %product_type.id(), "Product type deleted");

    Ok(DeletedDto {
        entity: "ProductType".to_string(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use herostore_core::StockCondition;

    fn request(id: Option<i64>, name: &str) -> ProductTypeRequest {
        ProductTypeRequest {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rename_list() {
        let db = test_support::database().await;

        let posters = create_product_type(&db, &request(None, "Posters")).await.unwrap();
        assert_eq!(posters.id, 2);

        let renamed = update_product_type(&db, 2, &request(None, "Wall Posters")).await.unwrap();
        assert_eq!(renamed.name, "Wall Posters");

        let names: Vec<_> = list_product_types(&db).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Mugs", "Wall Posters"]);
        assert_eq!(get_product_type(&db, 2).await.unwrap(), renamed);
    }

    #[tokio::test]
    async fn test_rejected_names() {
        let db = test_support::database().await;

        let err = create_product_type(&db, &request(None, "")).await.unwrap_err();
        assert_eq!(err.status_code, 422);

        let err = update_product_type(&db, 1, &request(None, "  ")).await.unwrap_err();
        assert_eq!(err.status_code, 422);
        assert_eq!(get_product_type(&db, 1).await.unwrap().name, "Mugs");

        let err = create_product_type(&db, &request(Some(1), "Cups")).await.unwrap_err();
        assert_eq!(err.status_code, 409);
    }

    #[tokio::test]
    async fn test_delete_takes_products_with_it() {
        let db = test_support::database().await;

        let deleted = delete_product_type(&db, 1).await.unwrap();
        assert_eq!(deleted.entity, "ProductType");

        assert!(db.products().list(StockCondition::All).await.unwrap().is_empty());
        let err = get_product_type(&db, 1).await.unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Product type not found for id 1"));
    }

    #[tokio::test]
    async fn test_missing_product_type() {
        let db = test_support::database().await;

        assert_eq!(delete_product_type(&db, 5).await.unwrap_err().status_code, 404);
        assert_eq!(
            update_product_type(&db, 5, &request(None, "Ghosts")).await.unwrap_err().status_code,
            404
        );
    }
}
