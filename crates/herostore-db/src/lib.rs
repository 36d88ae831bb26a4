//! # herostore-db: Database Layer for Hero Store
//!
//! This crate provides database access for Hero Store.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hero Store Data Flow                             │
//! │                                                                         │
//! │  CLI command (herostore order request.json)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   herostore-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ ProductRepo   │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ OrderRepo     │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    └───────────────┘    └──────────────┘  │   │
//! │  │   │               │    ┌───────────────┐                      │   │
//! │  │   │               │◄───│ OrderService  │ one tx per order     │   │
//! │  │   └───────────────┘    └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/herostore/herostore.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and order repositories
//! - [`service`] - Transactional order registration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use herostore_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("herostore.db")).await?;
//!
//! let order = db
//!     .order_service()
//!     .register_order(&[OrderLineRequest::new(ProductId::new(1), 3)])
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{OrderService, ServiceError, ServiceResult};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::product_type::ProductTypeRepository;
