//! # Validation Module
//!
//! Input validation utilities for Hero Store entities and order requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Order request                                                │
//! │  ├── validate_order_request: non-empty, positive bounded quantities    │
//! │  └── Reported as InvalidRequest (422)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entity constructors                                          │
//! │  ├── Product::new, ProductSnapshot::new, OrderLine::new, Order::new    │
//! │  ├── Each calls the rule functions below through a Violations list     │
//! │  └── Reported as InvalidEntityState (422)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are plain functions. There is no shared validator instance; every
//! constructor builds its own [`Violations`] and consumes it.
//!
//! ## Usage
//! ```rust
//! use herostore_core::validation::{require_non_blank, require_non_negative, Violations};
//!
//! let mut violations = Violations::new("Product");
//! violations.check(require_non_blank("name", ""), "");
//! violations.check(require_non_negative("stock", -1), -1);
//!
//! assert_eq!(violations.len(), 2);
//! assert!(violations.finish().is_err());
//! ```

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{CoreError, CoreResult, FieldViolation, ValidationError};
use crate::money::Money;
use crate::types::OrderLineRequest;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a string field is present and not only whitespace.
///
/// ## Example
/// ```rust
/// use herostore_core::validation::require_non_blank;
///
/// assert!(require_non_blank("name", "Iron Man Cup").is_ok());
/// assert!(require_non_blank("name", "   ").is_err());
/// ```
pub fn require_non_blank(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a product name: non-blank and at most 200 characters.
pub fn validate_product_name(field: &str, name: &str) -> ValidationResult<()> {
    require_non_blank(field, name)?;

    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that an integer is zero or more (stock levels).
pub fn require_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that an integer is strictly positive.
pub fn require_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that a decimal is zero or more (prices, totals).
pub fn require_non_negative_amount(field: &str, value: Decimal) -> ValidationResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a requested line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// There is no upper bound here. Whether a large quantity can be served is
/// decided against stock by the reconciler.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order request line: { productId: 1, quantity: 0 }                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity("orderLines[0].quantity", 0) ← THIS FUNCTION         │
/// │       │                                                                 │
/// │       ├── qty <= 0? → "orderLines[0].quantity must be positive"         │
/// │       │                                                                 │
/// │       └── OK → line goes on to the resolver                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    require_positive(field, qty)
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates that a collection has at least one element.
pub fn require_non_empty(field: &str, len: usize) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that a supplied total equals the calculated one.
///
/// Both sides are already rounded `Money`, so this is an exact comparison.
pub fn require_matching_total(field: &str, supplied: Money, calculated: Money) -> ValidationResult<()> {
    if supplied != calculated {
        return Err(ValidationError::Mismatch {
            field: field.to_string(),
            supplied: supplied.amount().to_string(),
            calculated: calculated.amount().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Violation Collector
// =============================================================================

/// Collects every failed rule of one constructor call.
///
/// ## Flow
/// ```text
/// Violations::new("OrderLine")
///      │
///      ├── check(rule_1, value_1)  ok  → nothing recorded
///      ├── check(rule_2, value_2)  err → FieldViolation pushed
///      │
///      ▼
/// finish() → Err(InvalidEntityState { entity: "OrderLine", [..] })
/// ```
#[derive(Debug)]
pub struct Violations {
    entity: &'static str,
    items: Vec<FieldViolation>,
}

impl Violations {
    /// Starts an empty list for the named entity.
    pub fn new(entity: &'static str) -> Self {
        Violations {
            entity,
            items: Vec::new(),
        }
    }

    /// Records the rule's error, if any, together with the rejected value.
    pub fn check<V: Serialize>(&mut self, result: ValidationResult<()>, invalid_value: V) -> &mut Self {
        if let Err(error) = result {
            let value = serde_json::to_value(invalid_value).unwrap_or(serde_json::Value::Null);
            self.items.push(FieldViolation::new(&error, value));
        }
        self
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when every checked rule passed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `Ok(())` if nothing failed, `InvalidEntityState` otherwise.
    pub fn finish(self) -> CoreResult<()> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidEntityState {
                entity: self.entity,
                violations: self.items,
            })
        }
    }

    fn into_items(self) -> Vec<FieldViolation> {
        self.items
    }
}

// =============================================================================
// Request Validation
// =============================================================================

/// Validates a registration request before it reaches the engine.
///
/// ## Rules
/// - `orderLines` must not be empty
/// - every `orderLines[i].quantity` must be positive
///
/// Every broken line is reported, not just the first.
///
/// ## Example
/// ```rust
/// use herostore_core::types::{OrderLineRequest, ProductId};
/// use herostore_core::validation::validate_order_request;
///
/// assert!(validate_order_request(&[]).is_err());
/// assert!(validate_order_request(&[OrderLineRequest::new(ProductId::new(1), 3)]).is_ok());
/// ```
pub fn validate_order_request(lines: &[OrderLineRequest]) -> CoreResult<()> {
    let mut violations = Violations::new("OrderRequest");

    violations.check(require_non_empty("orderLines", lines.len()), lines);

    for (index, line) in lines.iter().enumerate() {
        let field = format!("orderLines[{index}].quantity");
        violations.check(validate_quantity(&field, line.quantity), line.quantity);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidRequest(violations.into_items()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
