//! # Repository Module
//!
//! Database repository implementations for Hero Store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command / OrderService                                            │
//! │       │                                                                 │
//! │       │  db.products().list(StockCondition::Available)                 │
//! │       ▼                                                                 │
//! │  ProductRepository                  OrderRepository                    │
//! │  ├── get_by_id / find_by_ids        ├── get_by_id                      │
//! │  ├── list(condition)                ├── list (newest first)            │
//! │  ├── insert / update / delete       └── count                          │
//! │  └── count / next_id                                                    │
//! │                                                                         │
//! │  ProductTypeRepository                                                  │
//! │  └── get_by_id / list / insert / update / delete (cascades products)    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories own a pool and run each call on its own connection. The
//! crate-level `fetch_*` / `insert_*` / `apply_*` functions take a bare
//! connection so the registration service can run them inside one
//! transaction.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and stock filters
//! - [`ProductTypeRepository`](product_type::ProductTypeRepository) - Product type CRUD
//! - [`OrderRepository`](order::OrderRepository) - Order reads

use rust_decimal::Decimal;
use std::str::FromStr;

use herostore_core::Money;

use crate::error::{DbError, DbResult};

pub mod order;
pub mod product;
pub mod product_type;

/// Parses a decimal stored as TEXT.
pub(crate) fn parse_decimal(entity: &str, id: impl ToString, column: &str, text: &str) -> DbResult<Decimal> {
    Decimal::from_str(text)
        .map_err(|e| DbError::corrupt(entity, id, format!("{column} '{text}' is not a decimal: {e}")))
}

/// Parses a stored total. The text must already be rounded to the cent.
pub(crate) fn parse_money(entity: &str, id: impl ToString, column: &str, text: &str) -> DbResult<Money> {
    let id = id.to_string();
    let value = parse_decimal(entity, &id, column, text)?;
    let money = Money::new(value);
    if money.amount() != value {
        return Err(DbError::corrupt(entity, id, format!("{column} '{text}' is not rounded to the cent")));
    }
    Ok(money)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal_keeps_precision() {
        assert_eq!(parse_decimal("Product", 1, "price", "15.255").unwrap(), dec!(15.255));
        assert!(matches!(
            parse_decimal("Product", 1, "price", "abc"),
            Err(DbError::CorruptRow { .. })
        ));
    }

    #[test]
    fn test_parse_money_requires_cents() {
        assert_eq!(parse_money("Order", "o-1", "total", "75.00").unwrap(), Money::from_cents(7500));
        assert_eq!(parse_money("Order", "o-1", "total", "75").unwrap(), Money::from_cents(7500));
        assert!(parse_money("Order", "o-1", "total", "75.005").is_err());
    }
}
