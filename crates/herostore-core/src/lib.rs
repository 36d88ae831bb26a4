//! # herostore-core: Pure Business Logic for Hero Store
//!
//! This crate is the **heart** of Hero Store. It contains order registration
//! and inventory reconciliation as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hero Store Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    herostore CLI                                │   │
//! │  │    products ──► order ──► orders ──► export                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    herostore-db                                 │   │
//! │  │   OrderService: transaction, batch lookup, persist              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ herostore-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌────────────┐  ┌─────────────┐  │   │
//! │  │   │ catalog  │─►│ resolver │─►│ reconciler │─►│ order build │  │   │
//! │  │   └──────────┘  └──────────┘  └────────────┘  └─────────────┘  │   │
//! │  │        money • types • validation • export                     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type, half-up rounding to the cent
//! - [`types`] - Product, ProductType, ProductSnapshot, StockCondition, requests
//! - [`catalog`] - In-memory product view for one registration
//! - [`resolver`] - Request → product snapshot (fail-fast)
//! - [`reconciler`] - Stock checks and decrements (batched failures)
//! - [`order`] - Generic order aggregate and its builder
//! - [`registration`] - The full pipeline
//! - [`export`] - CSV / Excel / PDF renderers for orders and the catalog
//! - [`validation`] - Field rules and the violation collector
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use herostore_core::Money;
//! use rust_decimal::Decimal;
//!
//! // 15.255 × 2 = 30.510 → 30.51, never 30.50
//! let total = Money::line_total(Decimal::new(15255, 3), 2).unwrap();
//! assert_eq!(total.to_string(), "$30.51");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod export;
pub mod money;
pub mod order;
pub mod reconciler;
pub mod registration;
pub mod resolver;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, FieldViolation, ValidationError};
pub use export::{ExportError, ExportFormat, OrderExporter, Tabular};
pub use money::Money;
pub use order::{IdGenerator, LineItem, Order, OrderLine, UuidGenerator};
pub use reconciler::{InvalidOrderLine, StockMovement};
pub use registration::{register, Registration};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Store name printed on exported reports.
pub const DEFAULT_STORE_NAME: &str = "Hero Store";
