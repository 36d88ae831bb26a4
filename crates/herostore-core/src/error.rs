//! # Error Types
//!
//! Domain-specific error types for herostore-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  herostore-core errors (this file)                                     │
//! │  ├── CoreError        - Registration and entity failures               │
//! │  ├── ValidationError  - A single rule broken by a single field         │
//! │  └── FieldViolation   - Serializable (field, error, value) triple      │
//! │                                                                         │
//! │  herostore-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError or DbError from a registration       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policies
//! ```text
//! ProductNotFound     fail-fast, first missing id only        → 404
//! InvalidOrder        batched, one entry per short line       → 409
//! InvalidEntityState  field-tagged, every broken field        → 422
//! InvalidRequest      field-tagged, every broken request line → 422
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::reconciler::InvalidOrderLine;
use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// The application layer translates them into structured error bodies.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A requested product id is absent from the catalog.
    ///
    /// ## When This Occurs
    /// - Order request references an id the batch lookup did not return
    /// - Product was deleted between listing and ordering
    ///
    /// Only the first missing id is reported.
    #[error("Couldn't register product order: product not found for id {0}")]
    ProductNotFound(ProductId),

    /// Insufficient stock to remove the requested units.
    ///
    /// ## User Workflow
    /// ```text
    /// Order line (qty: 20)
    ///      │
    ///      ▼
    /// Product::remove_from_stock(20), stock = 10
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 1, available: 10, requested: 20 }
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// One or more order lines asked for more than the available stock.
    ///
    /// Carries one entry per failing line. No stock was changed.
    #[error("There are invalid product orders ({} invalid lines)", .0.len())]
    InvalidOrder(Vec<InvalidOrderLine>),

    /// An entity constructor rejected its inputs.
    ///
    /// ## When This Occurs
    /// - Blank product name, negative stock or price
    /// - Supplied line/order total disagrees with the calculated one
    /// - Order with no lines
    #[error("Invalid {entity} state: {}", describe(.violations))]
    InvalidEntityState {
        entity: &'static str,
        violations: Vec<FieldViolation>,
    },

    /// The order request itself is malformed (empty, bad quantities).
    #[error("Invalid order request: {}", describe(.0))]
    InvalidRequest(Vec<FieldViolation>),

    /// Decimal arithmetic left the representable range.
    #[error("Amount overflow while computing {operation}")]
    AmountOverflow { operation: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the field violations carried by this error, if any.
    pub fn violations(&self) -> Option<&[FieldViolation]> {
        match self {
            CoreError::InvalidEntityState { violations, .. } => Some(violations),
            CoreError::InvalidRequest(violations) => Some(violations),
            _ => None,
        }
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field_name, v.error))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending field so it can be reported as a
/// [`FieldViolation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value is not one of a fixed set of choices.
    #[error("{field} must be one of {expected}, got '{value}'")]
    InvalidChoice {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Collection must contain at least one element.
    #[error("{field} must contain at least one element")]
    Empty { field: String },

    /// Supplied value disagrees with the value computed from other fields.
    #[error("{field} does not match the calculated value: supplied {supplied}, calculated {calculated}")]
    Mismatch {
        field: String,
        supplied: String,
        calculated: String,
    },
}

impl ValidationError {
    /// Name of the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::Empty { field }
            | ValidationError::Mismatch { field, .. } => field,
        }
    }
}

// =============================================================================
// Field Violation
// =============================================================================

/// One broken field, in the shape callers receive it.
///
/// ```json
/// { "fieldName": "total", "error": "total does not match ...", "invalidValue": "10.00" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub field_name: String,
    pub error: String,
    pub invalid_value: serde_json::Value,
}

impl FieldViolation {
    /// Builds a violation from a validation error and the rejected value.
    pub fn new(error: &ValidationError, invalid_value: serde_json::Value) -> Self {
        FieldViolation {
            field_name: error.field().to_string(),
            error: error.to_string(),
            invalid_value,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_found_message_names_the_id() {
        let err = CoreError::ProductNotFound(ProductId::new(99));
        assert_eq!(
            err.to_string(),
            "Couldn't register product order: product not found for id 99"
        );
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: ProductId::new(1),
            available: 10,
            requested: 20,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 1: available 10, requested 20"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field(), "name");

        let err = ValidationError::Empty {
            field: "lines".to_string(),
        };
        assert_eq!(err.to_string(), "lines must contain at least one element");

        let err = ValidationError::InvalidChoice {
            field: "stockCondition".to_string(),
            value: "sold-out".to_string(),
            expected: "all, available or unavailable",
        };
        assert_eq!(
            err.to_string(),
            "stockCondition must be one of all, available or unavailable, got 'sold-out'"
        );
        assert_eq!(err.field(), "stockCondition");
    }

    #[test]
    fn test_field_violation_serializes_camel_case() {
        let err = ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        };
        let violation = FieldViolation::new(&err, json!(-1));
        let value = serde_json::to_value(&violation).unwrap();

        assert_eq!(value["fieldName"], "stock");
        assert_eq!(value["error"], "stock must not be negative");
        assert_eq!(value["invalidValue"], -1);
    }

    #[test]
    fn test_entity_state_lists_every_field() {
        let violations = vec![
            FieldViolation::new(
                &ValidationError::Required { field: "name".into() },
                json!(""),
            ),
            FieldViolation::new(
                &ValidationError::MustNotBeNegative { field: "stock".into() },
                json!(-3),
            ),
        ];
        let err = CoreError::InvalidEntityState {
            entity: "Product",
            violations,
        };

        assert_eq!(err.violations().map(|v| v.len()), Some(2));
        assert_eq!(
            err.to_string(),
            "Invalid Product state: name: name is required; stock: stock must not be negative"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.violations().is_none());
    }
}
