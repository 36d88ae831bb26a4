//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (service.rs) ← Joined with CoreError                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in CLI) ← Serialized error body                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a product id that already exists
    /// - Two lines of one order with the same line number
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (e.g. negative stock).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// A guarded stock update matched no row.
    ///
    /// ## When This Occurs
    /// Another registration changed the product's stock between our read
    /// and our write.
    /// ```text
    /// UPDATE products SET stock = stock - 3
    /// WHERE id = 1 AND stock = 10      ← stock is now 8, 0 rows
    /// ```
    #[error("Stock of product {product_id} changed concurrently (expected {expected})")]
    StaleStock { product_id: i64, expected: i64 },

    /// SQLite refused the write lock (SQLITE_BUSY / SQLITE_LOCKED).
    ///
    /// ## When This Occurs
    /// Another connection held the write lock for longer than the busy
    /// timeout.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// A stored row no longer satisfies the domain invariants.
    ///
    /// ## When This Occurs
    /// - Unparsable decimal text
    /// - Totals edited by hand so they no longer add up
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl ToString) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Creates a CorruptRow error.
    pub fn corrupt(entity: impl Into<String>, id: impl ToString, reason: impl ToString) -> Self {
        DbError::CorruptRow {
            entity: entity.into(),
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type,
///                               SQLITE_BUSY / SQLITE_LOCKED → DbError::Busy
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports constraints as text:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else if is_lock_contention(db_err.code().as_deref(), msg) {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including their extended codes.
fn is_lock_contention(code: Option<&str>, message: &str) -> bool {
    let primary = code.and_then(|c| c.parse::<i32>().ok()).map(|c| c & 0xff);
    matches!(primary, Some(5) | Some(6)) || message.contains("database is locked")
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_messages() {
        assert_eq!(DbError::not_found("Order", "abc").to_string(), "Order not found: abc");
        assert_eq!(
            DbError::duplicate("products.id", 1).to_string(),
            "Duplicate products.id: '1' already exists"
        );
        assert_eq!(
            DbError::StaleStock { product_id: 1, expected: 10 }.to_string(),
            "Stock of product 1 changed concurrently (expected 10)"
        );
    }

    #[test]
    fn test_lock_contention_codes() {
        assert!(is_lock_contention(Some("5"), "database is locked"));
        assert!(is_lock_contention(Some("517"), "database is locked"));
        assert!(is_lock_contention(Some("6"), "database table is locked"));
        assert!(is_lock_contention(None, "database is locked"));
        assert!(!is_lock_contention(Some("19"), "UNIQUE constraint failed: products.id"));
        assert!(!is_lock_contention(None, "no such table: widgets"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
