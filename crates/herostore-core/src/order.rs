//! # Order Aggregate
//!
//! The immutable order and its lines, plus the builder that assembles them
//! from reconciled lines.
//!
//! ## One Aggregate, Any Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  trait LineItem { fn total(&self) -> Money }                           │
//! │                                                                         │
//! │  Order<OrderLine>             a product order                          │
//! │  ├── OrderLine  total = round(price × qty)                             │
//! │  └── OrderLine                                                          │
//! │                                                                         │
//! │  Order<Order<OrderLine>>      a payment order made of product orders   │
//! │  ├── Order<OrderLine>  (is itself a LineItem)                          │
//! │  └── Order<OrderLine>                                                   │
//! │                                                                         │
//! │  Both levels enforce: lines non-empty, total >= 0,                     │
//! │                       total == round(Σ line.total())                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Construction either returns an aggregate whose invariants hold or an
//! `InvalidEntityState` naming every broken field. There are no setters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::Money;
use crate::resolver::ResolvedLine;
use crate::types::ProductSnapshot;
use crate::validation::{
    require_matching_total, require_non_blank, require_non_empty, require_non_negative,
    require_non_negative_amount, require_positive, Violations,
};

// =============================================================================
// Line Item
// =============================================================================

/// Anything that can be a line of an [`Order`].
pub trait LineItem {
    /// Rounded total of this line.
    fn total(&self) -> Money;
}

// =============================================================================
// Identity
// =============================================================================

/// Source of order and line ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    id: String,
    line_number: u32,
    #[serde(rename = "productDetail")]
    product: ProductSnapshot,
    quantity: i64,
    total: Money,
}

impl OrderLine {
    /// Creates a line, checking the supplied total.
    ///
    /// ## Rules
    /// - `id` non-blank, `lineNumber` >= 1
    /// - `quantity` >= 0
    /// - `total` == round(product price × quantity, 2)
    ///
    /// ## Example
    /// ```rust
    /// use herostore_core::money::Money;
    /// use herostore_core::order::OrderLine;
    /// use herostore_core::types::{ProductId, ProductSnapshot};
    /// use rust_decimal::Decimal;
    ///
    /// let cup = ProductSnapshot::new(ProductId::new(1), "Iron Man Cup", Decimal::new(2500, 2)).unwrap();
    ///
    /// assert!(OrderLine::new("l-1", 1, cup.clone(), 3, Money::from_cents(7500)).is_ok());
    /// assert!(OrderLine::new("l-1", 1, cup, 3, Money::from_cents(7000)).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        line_number: u32,
        product: ProductSnapshot,
        quantity: i64,
        total: Money,
    ) -> CoreResult<Self> {
        let id = id.into();
        let calculated = Money::line_total(product.price(), quantity)?;

        let mut violations = Violations::new("OrderLine");
        violations
            .check(require_non_blank("id", &id), &id)
            .check(require_positive("lineNumber", i64::from(line_number)), line_number)
            .check(require_non_negative("quantity", quantity), quantity)
            .check(require_matching_total("total", total, calculated), total);
        violations.finish()?;

        Ok(OrderLine {
            id,
            line_number,
            product,
            quantity,
            total,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 1-based position within the order.
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}

impl LineItem for OrderLine {
    fn total(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order aggregate over lines of type `L`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order<L = OrderLine> {
    id: String,
    lines: Vec<L>,
    created_at: DateTime<Utc>,
    total: Money,
}

impl<L: LineItem> Order<L> {
    /// Creates an order, checking the supplied grand total.
    ///
    /// ## Rules
    /// - `id` non-blank
    /// - `lines` non-empty
    /// - `total` >= 0 and == round(Σ line totals, 2)
    pub fn new(
        id: impl Into<String>,
        lines: Vec<L>,
        created_at: DateTime<Utc>,
        total: Money,
    ) -> CoreResult<Self> {
        let id = id.into();
        let calculated = Money::checked_sum(lines.iter().map(LineItem::total))?;

        let mut violations = Violations::new("Order");
        violations
            .check(require_non_blank("id", &id), &id)
            .check(require_non_empty("lines", lines.len()), lines.len())
            .check(require_non_negative_amount("total", total.amount()), total)
            .check(require_matching_total("total", total, calculated), total);
        violations.finish()?;

        Ok(Order {
            id,
            lines,
            created_at,
            total,
        })
    }

    /// Creates an order whose total is the sum of its lines.
    pub fn assemble(id: impl Into<String>, lines: Vec<L>, created_at: DateTime<Utc>) -> CoreResult<Self> {
        let total = Money::checked_sum(lines.iter().map(LineItem::total))?;
        Order::new(id, lines, created_at, total)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lines(&self) -> &[L] {
        &self.lines
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

impl<L: LineItem> LineItem for Order<L> {
    fn total(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a product order from reconciled lines.
///
/// ## Process
/// ```text
/// ResolvedLine { Cup @ 25.00, qty 3 }      ResolvedLine { Keychain @ 15.255, qty 2 }
///        │                                          │
///        ▼                                          ▼
/// OrderLine #1 total 75.00                 OrderLine #2 total 30.51
///        └──────────────────┬───────────────────────┘
///                           ▼
///               Order total 105.51
/// ```
///
/// The order id is drawn first, then one id per line.
pub fn build_order<G>(lines: &[ResolvedLine], ids: &mut G, created_at: DateTime<Utc>) -> CoreResult<Order<OrderLine>>
where
    G: IdGenerator + ?Sized,
{
    let order_id = ids.next_id();

    let order_lines = (1u32..)
        .zip(lines)
        .map(|(line_number, line)| {
            let total = Money::line_total(line.product.price(), line.quantity)?;
            OrderLine::new(ids.next_id(), line_number, line.product.clone(), line.quantity, total)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    Order::assemble(order_id, order_lines, created_at)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::ProductId;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    struct SequentialIds(u32);

    impl IdGenerator for SequentialIds {
        fn next_id(&mut self) -> String {
            self.0 += 1;
            format!("id-{}", self.0)
        }
    }

    fn cup() -> ProductSnapshot {
        ProductSnapshot::new(ProductId::new(1), "Iron Man Cup", dec!(25.00)).unwrap()
    }

    fn keychain() -> ProductSnapshot {
        ProductSnapshot::new(ProductId::new(7), "Thor Hammer Keychain", dec!(15.255)).unwrap()
    }

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 13, 30, 0).unwrap()
    }

    fn fields(err: &CoreError) -> Vec<String> {
        err.violations()
            .unwrap()
            .iter()
            .map(|v| v.field_name.clone())
            .collect()
    }

    #[test]
    fn test_line_total_is_checked() {
        let line = OrderLine::new("l-1", 1, keychain(), 2, Money::from_cents(3051)).unwrap();
        assert_eq!(line.total(), Money::from_cents(3051));

        // 30.50 would be the float-truncated answer
        let err = OrderLine::new("l-1", 1, keychain(), 2, Money::from_cents(3050)).unwrap_err();
        assert_eq!(fields(&err), vec!["total"]);
    }

    #[test]
    fn test_line_rejects_bad_fields() {
        let err = OrderLine::new(" ", 0, cup(), -1, Money::from_cents(-2500)).unwrap_err();
        assert_eq!(fields(&err), vec!["id", "lineNumber", "quantity"]);
    }

    #[test]
    fn test_order_requires_lines() {
        let err = Order::<OrderLine>::new("o-1", Vec::new(), created_at(), Money::zero()).unwrap_err();
        assert_eq!(fields(&err), vec!["lines"]);
    }

    #[test]
    fn test_order_total_must_match() {
        let line = OrderLine::new("l-1", 1, cup(), 3, Money::from_cents(7500)).unwrap();
        let err = Order::new("o-1", vec![line], created_at(), Money::from_cents(7600)).unwrap_err();
        assert_eq!(fields(&err), vec!["total"]);
    }

    #[test]
    fn test_order_total_must_not_be_negative() {
        let line = OrderLine::new("l-1", 1, cup(), 0, Money::zero()).unwrap();
        let err = Order::new("o-1", vec![line], created_at(), Money::from_cents(-1)).unwrap_err();
        assert_eq!(fields(&err), vec!["total", "total"]);
    }

    #[test]
    fn test_build_order() {
        let lines = vec![
            ResolvedLine { product: cup(), quantity: 3 },
            ResolvedLine { product: keychain(), quantity: 2 },
        ];
        let mut ids = SequentialIds(0);

        let order = build_order(&lines, &mut ids, created_at()).unwrap();

        assert_eq!(order.id(), "id-1");
        assert_eq!(order.line_count(), 2);
        assert_eq!(order.lines()[0].id(), "id-2");
        assert_eq!(order.lines()[0].line_number(), 1);
        assert_eq!(order.lines()[0].total(), Money::from_cents(7500));
        assert_eq!(order.lines()[1].line_number(), 2);
        assert_eq!(order.lines()[1].total(), Money::from_cents(3051));
        assert_eq!(order.total(), Money::from_cents(10551));
        assert_eq!(order.created_at(), created_at());
    }

    #[test]
    fn test_build_order_with_uuids() {
        let lines = vec![ResolvedLine { product: cup(), quantity: 1 }];
        let order = build_order(&lines, &mut UuidGenerator, created_at()).unwrap();

        assert!(Uuid::parse_str(order.id()).is_ok());
        assert_ne!(order.id(), order.lines()[0].id());
    }

    #[test]
    fn test_order_of_orders_reuses_invariants() {
        let first = Order::assemble(
            "o-1",
            vec![OrderLine::new("l-1", 1, cup(), 3, Money::from_cents(7500)).unwrap()],
            created_at(),
        )
        .unwrap();
        let second = Order::assemble(
            "o-2",
            vec![OrderLine::new("l-2", 1, keychain(), 2, Money::from_cents(3051)).unwrap()],
            created_at(),
        )
        .unwrap();

        let payment = Order::assemble("p-1", vec![first.clone(), second.clone()], created_at()).unwrap();
        assert_eq!(payment.total(), Money::from_cents(10551));

        let err = Order::new("p-1", vec![first, second], created_at(), Money::from_cents(10550)).unwrap_err();
        assert_eq!(fields(&err), vec!["total"]);
    }

    #[test]
    fn test_order_json_shape() {
        let line = OrderLine::new("l-1", 1, cup(), 3, Money::from_cents(7500)).unwrap();
        let order = Order::new("o-1", vec![line], created_at(), Money::from_cents(7500)).unwrap();

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["total"], "75.00");
        assert_eq!(json["lines"][0]["productDetail"]["name"], "Iron Man Cup");
        assert_eq!(json["lines"][0]["lineNumber"], 1);
    }
}
