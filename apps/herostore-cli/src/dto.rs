//! # Data Transfer Objects
//!
//! The JSON contract of the CLI. Field names are camelCase, money and prices
//! are decimal strings (`"75.00"`, `"15.255"`).
//!
//! TypeScript bindings are generated with `ts-rs` into `bindings/` when the
//! test suite runs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use herostore_core::{
    FieldViolation, InvalidOrderLine, LineItem, Money, Order, OrderLine, OrderLineRequest, Product, ProductId,
    ProductType,
};

// =============================================================================
// Requests
// =============================================================================

/// Body of the `order` command.
///
/// ```json
/// { "orderLines": [ { "productId": 1, "quantity": 3 } ] }
/// ```
///
/// A missing `orderLines` reads as an empty list and is rejected by
/// validation, not by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    #[serde(default)]
    pub order_lines: Vec<OrderLineRequestDto>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLineRequestDto {
    pub product_id: i64,
    pub quantity: i64,
}

impl OrderRequest {
    /// Converts to the engine's request lines, preserving order.
    pub fn to_lines(&self) -> Vec<OrderLineRequest> {
        self.order_lines
            .iter()
            .map(|line| OrderLineRequest::new(ProductId::new(line.product_id), line.quantity))
            .collect()
    }
}

/// Body of `product create` and `product update`.
///
/// ```json
/// { "name": "Iron Man Cup", "productTypeId": 1, "stock": 10, "price": "25.00" }
/// ```
///
/// `id` is only read by `product create`; without it the next free id is used.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRequest {
    #[serde(default)]
    #[ts(optional)]
    pub id: Option<i64>,
    pub name: String,
    pub product_type_id: i64,
    pub stock: i64,
    #[ts(type = "string")]
    pub price: Decimal,
}

/// Body of `product-type create` and `product-type update`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductTypeRequest {
    #[serde(default)]
    #[ts(optional)]
    pub id: Option<i64>,
    pub name: String,
}

// =============================================================================
// Responses
// =============================================================================

/// A registered order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderResponse {
    pub id: String,
    pub lines: Vec<OrderLineResponse>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLineResponse {
    pub id: String,
    pub line_number: u32,
    pub product_id: i64,
    pub product_name: String,
    #[ts(type = "string")]
    pub product_price: Decimal,
    pub quantity: i64,
    #[ts(type = "string")]
    pub total: Money,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        OrderLineResponse {
            id: line.id().to_string(),
            line_number: line.line_number(),
            product_id: line.product().id().value(),
            product_name: line.product().name().to_string(),
            product_price: line.product().price(),
            quantity: line.quantity(),
            total: line.total(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        OrderResponse {
            id: order.id().to_string(),
            lines: order.lines().iter().map(OrderLineResponse::from).collect(),
            created_at: order.created_at(),
            total: order.total(),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub product_type: ProductTypeDto,
    pub product_type_name: String,
    pub stock: i64,
    #[ts(type = "string")]
    pub price: Decimal,
    /// `stock > 0`
    pub available: bool,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id().value(),
            name: p.name().to_string(),
            product_type: ProductTypeDto::from(p.product_type()),
            product_type_name: p.product_type().name().to_string(),
            stock: p.stock(),
            price: p.price(),
            available: p.is_available(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductTypeDto {
    pub id: i64,
    pub name: String,
}

impl From<&ProductType> for ProductTypeDto {
    fn from(t: &ProductType) -> Self {
        ProductTypeDto {
            id: t.id().value(),
            name: t.name().to_string(),
        }
    }
}

/// Result of a `delete` command.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeletedDto {
    pub entity: String,
    pub id: i64,
}

/// Result of the export commands.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExportSummary {
    pub format: String,
    pub content_type: String,
    pub path: String,
    /// Orders, products or product types written
    pub records: usize,
    pub bytes: usize,
}

// =============================================================================
// Error body parts
// =============================================================================

/// One order line that asked for more than the available stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvalidLineDto {
    pub id: i64,
    pub name: String,
    pub requested_quantity: i64,
    pub stock: i64,
}

impl From<InvalidOrderLine> for InvalidLineDto {
    fn from(line: InvalidOrderLine) -> Self {
        InvalidLineDto {
            id: line.id.value(),
            name: line.name,
            requested_quantity: line.requested_quantity,
            stock: line.stock,
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldErrorDto {
    pub field_name: String,
    pub error: String,
    #[ts(type = "unknown")]
    pub invalid_value: serde_json::Value,
}

impl From<FieldViolation> for FieldErrorDto {
    fn from(v: FieldViolation) -> Self {
        FieldErrorDto {
            field_name: v.field_name,
            error: v.error,
            invalid_value: v.invalid_value,
        }
    }
}
