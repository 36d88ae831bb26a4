//! # Hero Store CLI Library
//!
//! Command line front end for the Hero Store order engine and its catalog.
//!
//! ## Module Organization
//! ```text
//! herostore_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── Environment configuration
//! ├── dto.rs          ◄─── JSON request/response types (ts-rs exported)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Argument parsing and dispatch
//! │   ├── product.rs       ◄─── products, product
//! │   ├── product_type.rs  ◄─── product-types, product-type
//! │   ├── order.rs         ◄─── order, orders
//! │   └── export.rs        ◄─── export, products export, product-types export
//! └── error.rs        ◄─── API error bodies
//! ```
//!
//! Responses and error bodies go to stdout as JSON. Logs go to stderr.

pub mod commands;
pub mod config;
pub mod dto;
pub mod error;

use std::process::ExitCode;

use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::{Command, USAGE};
use config::AppConfig;
use error::ApiError;
use herostore_db::{Database, DbConfig};

/// Runs the CLI with the process arguments.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging     tracing-subscriber, RUST_LOG overrides       │
/// │  2. Parse Command          usage errors exit with code 2                │
/// │  3. Load Configuration     HEROSTORE_* environment variables            │
/// │  4. Connect to Database    SQLite with WAL mode, pending migrations     │
/// │  5. Execute Command        JSON response or error body on stdout        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    init_tracing();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    if command == Command::Help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let path = command.path();
    debug!(%path, "Running command");

    match run_command(command).await {
        Ok(response) => {
            print_json(&response);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_json(&err.with_path(path));
            ExitCode::FAILURE
        }
    }
}

async fn run_command(command: Command) -> Result<serde_json::Value, ApiError> {
    let config = AppConfig::load()?;
    let db = open_database(&config).await?;

    let result = commands::execute(command, &db, &config).await;

    db.close().await;
    result
}

/// Opens the configured database, creating its directory if needed.
async fn open_database(config: &AppConfig) -> Result<Database, ApiError> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    info!(db_path = %config.db_path.display(), "Opening database");

    let db = Database::new(DbConfig::new(&config.db_path).max_connections(config.max_connections)).await?;
    Ok(db)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: failed to serialize response: {}", e),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=herostore_db=trace` - Show trace for the database crate only
/// - Default: INFO, DEBUG for herostore crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,herostore=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
