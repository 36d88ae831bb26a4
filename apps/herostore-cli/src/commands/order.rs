//! # Order Commands
//!
//! Registration and retrieval of orders.
//!
//! ## Registration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  herostore order request.json                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read_request ──── unreadable / malformed JSON ──► 400 Bad Request      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderService::register_order                                           │
//! │       │  empty / bad quantity ─────────────────► 422 Validation Error   │
//! │       │  unknown product ──────────────────────► 404 Resource Not Found │
//! │       │  short on stock ───────────────────────► 409 Invalid Order      │
//! │       ▼                                                                 │
//! │  OrderResponse (id, lines, createdAt, total)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use herostore_db::Database;

use super::{parse_json, read_json};
use crate::dto::{OrderRequest, OrderResponse};
use crate::error::ApiError;

/// Reads an order request from a file, or from stdin when `source` is `-`.
pub fn read_request(source: &str) -> Result<OrderRequest, ApiError> {
    read_json(source, "order request")
}

pub fn parse_request(text: &str) -> Result<OrderRequest, ApiError> {
    parse_json(text, "order request")
}

/// Registers an order.
pub async fn register_order(db: &Database, request: &OrderRequest) -> Result<OrderResponse, ApiError> {
    let lines = request.to_lines();
    let order = db.order_service().register_order(&lines).await?;

    info!(order_id = %order.id(), "Order accepted");
    Ok(OrderResponse::from(&order))
}

/// Lists every order, newest first.
pub async fn list_orders(db: &Database) -> Result<Vec<OrderResponse>, ApiError> {
    let orders = db.order_service().list_orders().await?;
    Ok(orders.iter().map(OrderResponse::from).collect())
}

/// Gets a single order by id.
pub async fn get_order(db: &Database, id: &str) -> Result<OrderResponse, ApiError> {
    let order = db.order_service().get_order(id).await?;
    Ok(OrderResponse::from(&order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorKind;
    use herostore_core::{Money, ProductId};

    fn request(lines: &[(i64, i64)]) -> OrderRequest {
        let body = serde_json::json!({
            "orderLines": lines
                .iter()
                .map(|(id, qty)| serde_json::json!({ "productId": id, "quantity": qty }))
                .collect::<Vec<_>>()
        });
        parse_request(&body.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_order() {
        let db = test_support::database().await;

        let response = register_order(&db, &request(&[(1, 3)])).await.unwrap();

        assert_eq!(response.total, Money::from_cents(7500));
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].product_name, "Iron Man Cup");

        let stock = db.products().get_by_id(ProductId::new(1)).await.unwrap().unwrap().stock();
        assert_eq!(stock, 7);

        let fetched = get_order(&db, &response.id).await.unwrap();
        assert_eq!(fetched.total, response.total);
        assert_eq!(list_orders(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_body() {
        let db = test_support::database().await;

        let err = register_order(&db, &request(&[(1, 20)])).await.unwrap_err();

        assert_eq!(err.error, ErrorKind::InvalidOrder);
        assert_eq!(err.status_code, 409);
        let lines = err.invalid_lines.unwrap();
        assert_eq!(lines[0].name, "Iron Man Cup");
        assert_eq!(lines[0].requested_quantity, 20);
        assert_eq!(lines[0].stock, 10);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_support::database().await;

        let err = register_order(&db, &request(&[(99, 1)])).await.unwrap_err();

        assert_eq!(err.status_code, 404);
        assert_eq!(
            err.message.as_deref(),
            Some("Couldn't register product order: product not found for id 99")
        );
    }

    #[tokio::test]
    async fn test_missing_lines_is_validation_error() {
        let db = test_support::database().await;

        let err = register_order(&db, &parse_request("{}").unwrap()).await.unwrap_err();

        assert_eq!(err.status_code, 422);
        let fields = err.field_validation_errors.unwrap();
        assert_eq!(fields[0].field_name, "orderLines");
    }

    #[tokio::test]
    async fn test_unknown_order_id() {
        let db = test_support::database().await;
        let err = get_order(&db, "missing").await.unwrap_err();
        assert_eq!(err.error, ErrorKind::NotFound);
    }

    #[test]
    fn test_malformed_request() {
        let err = parse_request(r#"{"orderLines": [{"productId": "one"}]}"#).unwrap_err();
        assert_eq!(err.error, ErrorKind::BadRequest);
        assert_eq!(err.status_code, 400);
    }

    #[test]
    fn test_unreadable_file() {
        let err = read_request("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.status_code, 400);
        assert!(err
            .message
            .unwrap()
            .starts_with("Couldn't read order request from /definitely/not/here.json"));
    }
}
