//! # Domain Types
//!
//! Catalog types used throughout Hero Store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   snapshot()   ┌─────────────────┐                 │
//! │  │    Product      │ ─────────────► │ ProductSnapshot │                 │
//! │  │  ─────────────  │                │  ─────────────  │                 │
//! │  │  id (i64)       │                │  id             │                 │
//! │  │  name           │                │  name           │                 │
//! │  │  product_type ──┼──┐             │  price          │                 │
//! │  │  stock (>= 0)   │  │             │  (frozen copy)  │                 │
//! │  │  price (exact)  │  │             └─────────────────┘                 │
//! │  └─────────────────┘  │  ┌─────────────────┐                            │
//! │                       └─►│  ProductType    │                            │
//! │                          │  id, name       │                            │
//! │                          └─────────────────┘                            │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐                             │
//! │  │ StockCondition  │   │ OrderLineRequest │                             │
//! │  │  All            │   │  product_id      │                             │
//! │  │  Available      │   │  quantity        │                             │
//! │  │  Unavailable    │   └──────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Snapshots?
//! An order line keeps the name and price the product had when the order
//! was placed. Renaming or repricing a product later does not rewrite
//! history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{
    require_non_negative, require_non_negative_amount, validate_product_name, Violations,
};

// =============================================================================
// Product Id
// =============================================================================

/// Externally assigned product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        ProductId(id)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

// =============================================================================
// Product Type
// =============================================================================

/// Product type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductTypeId(i64);

impl ProductTypeId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        ProductTypeId(id)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductTypeId {
    fn from(id: i64) -> Self {
        ProductTypeId(id)
    }
}

/// A category of products, such as "Mugs" or "Posters".
///
/// Every product belongs to exactly one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    id: ProductTypeId,
    name: String,
}

impl ProductType {
    /// Creates a validated product type. The name follows the product name
    /// rules: non-blank, at most 200 characters.
    pub fn new(id: ProductTypeId, name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();

        let mut violations = Violations::new("ProductType");
        violations.check(validate_product_name("name", &name), &name);
        violations.finish()?;

        Ok(ProductType { id, name })
    }

    pub fn id(&self) -> ProductTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the name, keeping the old one if the new one is invalid.
    pub fn rename(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let renamed = ProductType::new(self.id, name)?;
        *self = renamed;
        Ok(())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Fields are private: stock only changes through
/// [`Product::remove_from_stock`], so it can never go negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    product_type: ProductType,
    stock: i64,
    price: Decimal,
}

impl Product {
    /// Creates a validated product.
    ///
    /// ## Rules
    /// - `name` non-blank, at most 200 characters
    /// - `product_type` is required (already validated by its own constructor)
    /// - `stock` >= 0
    /// - `price` >= 0 (kept exact, not rounded)
    ///
    /// Every broken rule is reported in one `InvalidEntityState`.
    ///
    /// ## Example
    /// ```rust
    /// use herostore_core::types::{Product, ProductId, ProductType, ProductTypeId};
    /// use rust_decimal::Decimal;
    ///
    /// let mugs = ProductType::new(ProductTypeId::new(1), "Mugs").unwrap();
    /// let cup = Product::new(ProductId::new(1), "Iron Man Cup", mugs.clone(), 10, Decimal::new(2500, 2)).unwrap();
    /// assert_eq!(cup.stock(), 10);
    /// assert_eq!(cup.product_type().name(), "Mugs");
    ///
    /// assert!(Product::new(ProductId::new(2), "", mugs, -1, Decimal::ZERO).is_err());
    /// ```
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        product_type: ProductType,
        stock: i64,
        price: Decimal,
    ) -> CoreResult<Self> {
        let name = name.into();

        let mut violations = Violations::new("Product");
        violations
            .check(validate_product_name("name", &name), &name)
            .check(require_non_negative("stock", stock), stock)
            .check(require_non_negative_amount("price", price), price);
        violations.finish()?;

        Ok(Product {
            id,
            name,
            product_type,
            stock,
            price,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_type(&self) -> &ProductType {
        &self.product_type
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Unit price, exactly as stored.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Whether at least one unit is in stock.
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Removes `amount` units from stock.
    ///
    /// ## Errors
    /// - `Validation(MustNotBeNegative)` on field `amount` if `amount < 0`
    /// - `InsufficientStock` if `amount > stock`; stock is left unchanged
    ///
    /// ## Example
    /// ```rust
    /// use herostore_core::types::{Product, ProductId, ProductType, ProductTypeId};
    /// use rust_decimal::Decimal;
    ///
    /// let mugs = ProductType::new(ProductTypeId::new(1), "Mugs").unwrap();
    /// let mut cup = Product::new(ProductId::new(1), "Iron Man Cup", mugs, 10, Decimal::new(2500, 2)).unwrap();
    /// cup.remove_from_stock(3).unwrap();
    /// assert_eq!(cup.stock(), 7);
    ///
    /// assert!(cup.remove_from_stock(8).is_err());
    /// assert_eq!(cup.stock(), 7);
    /// ```
    pub fn remove_from_stock(&mut self, amount: i64) -> CoreResult<()> {
        require_non_negative("amount", amount)?;

        if amount > self.stock {
            return Err(CoreError::InsufficientStock {
                product_id: self.id,
                available: self.stock,
                requested: amount,
            });
        }

        self.stock -= amount;
        Ok(())
    }

    /// Freezes id, name and price for an order line.
    pub fn snapshot(&self) -> ProductSnapshot {
        // Product invariants already cover the snapshot's.
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
        }
    }
}

// =============================================================================
// Product Snapshot
// =============================================================================

/// Immutable copy of a product's identity, name and price, embedded in an
/// order line as its product detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    id: ProductId,
    name: String,
    price: Decimal,
}

impl ProductSnapshot {
    /// Creates a validated snapshot.
    ///
    /// Field names are reported under `productDetail.` because a snapshot
    /// only ever lives inside an order line.
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> CoreResult<Self> {
        let name = name.into();

        let mut violations = Violations::new("ProductSnapshot");
        violations
            .check(validate_product_name("productDetail.name", &name), &name)
            .check(require_non_negative_amount("productDetail.price", price), price);
        violations.finish()?;

        Ok(ProductSnapshot { id, name, price })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

// =============================================================================
// Stock Condition
// =============================================================================

/// Catalog listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockCondition {
    /// Every product.
    #[default]
    All,
    /// Products with stock > 0.
    Available,
    /// Products with stock == 0.
    Unavailable,
}

impl StockCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockCondition::All => "all",
            StockCondition::Available => "available",
            StockCondition::Unavailable => "unavailable",
        }
    }

    /// Whether `product` passes this filter.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            StockCondition::All => true,
            StockCondition::Available => product.is_available(),
            StockCondition::Unavailable => !product.is_available(),
        }
    }
}

impl FromStr for StockCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StockCondition::All),
            "available" => Ok(StockCondition::Available),
            "unavailable" => Ok(StockCondition::Unavailable),
            _ => Err(ValidationError::InvalidChoice {
                field: "stockCondition".to_string(),
                value: s.to_string(),
                expected: "all, available or unavailable",
            }),
        }
    }
}

// =============================================================================
// Order Line Request
// =============================================================================

/// One requested `(productId, quantity)` pair.
///
/// ```json
/// { "productId": 1, "quantity": 3 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderLineRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        OrderLineRequest {
            product_id,
            quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn mugs() -> ProductType {
        ProductType::new(ProductTypeId::new(1), "Mugs").unwrap()
    }

    fn iron_man_cup() -> Product {
        Product::new(ProductId::new(1), "Iron Man Cup", mugs(), 10, dec!(25.00)).unwrap()
    }

    #[test]
    fn test_product_type_name_is_validated() {
        let err = ProductType::new(ProductTypeId::new(2), "  ").unwrap_err();
        assert_eq!(err.violations().unwrap()[0].field_name, "name");
        assert!(ProductType::new(ProductTypeId::new(2), "a".repeat(201)).is_err());
    }

    #[test]
    fn test_product_type_rename() {
        let mut kind = mugs();
        kind.rename("Cups").unwrap();
        assert_eq!(kind.name(), "Cups");

        assert!(kind.rename("").is_err());
        assert_eq!(kind.name(), "Cups");
        assert_eq!(kind.id(), ProductTypeId::new(1));
    }

    #[test]
    fn test_product_serializes_its_type() {
        let value = serde_json::to_value(iron_man_cup()).unwrap();
        assert_eq!(value["productType"]["id"], 1);
        assert_eq!(value["productType"]["name"], "Mugs");
        assert_eq!(value["price"], "25.00");
    }

    #[test]
    fn test_product_new_reports_every_field() {
        let err = Product::new(ProductId::new(1), " ", mugs(), -1, dec!(-0.5)).unwrap_err();
        let fields: Vec<_> = err
            .violations()
            .unwrap()
            .iter()
            .map(|v| v.field_name.clone())
            .collect();
        assert_eq!(fields, vec!["name", "stock", "price"]);
    }

    #[test]
    fn test_price_is_not_rounded() {
        let product = Product::new(ProductId::new(7), "Thor Hammer Keychain", mugs(), 4, dec!(15.255)).unwrap();
        assert_eq!(product.price(), dec!(15.255));
    }

    #[test]
    fn test_remove_from_stock() {
        let mut cup = iron_man_cup();
        cup.remove_from_stock(10).unwrap();
        assert_eq!(cup.stock(), 0);
        assert!(!cup.is_available());
    }

    #[test]
    fn test_remove_from_stock_rejects_negative_amount() {
        let mut cup = iron_man_cup();
        let err = cup.remove_from_stock(-1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustNotBeNegative { ref field }) if field == "amount"
        ));
        assert_eq!(cup.stock(), 10);
    }

    #[test]
    fn test_remove_from_stock_rejects_more_than_stock() {
        let mut cup = iron_man_cup();
        let err = cup.remove_from_stock(20).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 10, requested: 20, .. }
        ));
        assert_eq!(cup.stock(), 10);
    }

    #[test]
    fn test_snapshot_survives_product_changes() {
        let mut cup = iron_man_cup();
        let snapshot = cup.snapshot();
        cup.remove_from_stock(5).unwrap();

        assert_eq!(snapshot.id(), ProductId::new(1));
        assert_eq!(snapshot.name(), "Iron Man Cup");
        assert_eq!(snapshot.price(), dec!(25.00));
    }

    #[test]
    fn test_snapshot_fields_are_product_detail() {
        let err = ProductSnapshot::new(ProductId::new(1), "", dec!(1)).unwrap_err();
        assert_eq!(err.violations().unwrap()[0].field_name, "productDetail.name");
    }

    #[test]
    fn test_stock_condition() {
        let mut cup = iron_man_cup();
        assert!(StockCondition::Available.matches(&cup));
        assert!(!StockCondition::Unavailable.matches(&cup));

        cup.remove_from_stock(10).unwrap();
        assert!(StockCondition::Unavailable.matches(&cup));
        assert!(StockCondition::All.matches(&cup));

        assert_eq!("AVAILABLE".parse::<StockCondition>().unwrap(), StockCondition::Available);
    }

    #[test]
    fn test_unknown_stock_condition_is_invalid_choice() {
        let err = "sold-out".parse::<StockCondition>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidChoice {
                field: "stockCondition".to_string(),
                value: "sold-out".to_string(),
                expected: "all, available or unavailable",
            }
        );
    }

    #[test]
    fn test_order_line_request_json() {
        let request: OrderLineRequest = serde_json::from_str(r#"{"productId":1,"quantity":3}"#).unwrap();
        assert_eq!(request, OrderLineRequest::new(ProductId::new(1), 3));
    }
}
