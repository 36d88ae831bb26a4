//! # Hero Store CLI Entry Point
//!
//! ```text
//! $ herostore order request.json
//! {
//!   "id": "5f0c2a9e-...",
//!   "lines": [ { "productName": "Iron Man Cup", "quantity": 3, "total": "75.00", ... } ],
//!   "createdAt": "2024-05-04T12:30:00.123Z",
//!   "total": "75.00"
//! }
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    herostore_cli::run().await
}
