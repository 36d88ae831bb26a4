//! # CLI Commands
//!
//! Command parsing and dispatch.
//!
//! ```text
//! herostore products [all|available|unavailable]        list the catalog
//! herostore products export <format> [condition] [out]  export the catalog
//! herostore product get|create|update|delete ...        one product
//! herostore product-types [export <format> [out]]       list or export types
//! herostore product-type get|create|update|delete ...   one product type
//! herostore order <json-file|->                         register an order
//! herostore orders [id]                                 list orders, or show one
//! herostore export <format> [out-file]                  export every order
//! ```
//!
//! Each command function takes the database and returns a DTO or an
//! [`ApiError`]; the binary prints whichever it gets as JSON.

pub mod export;
pub mod order;
pub mod product;
pub mod product_type;

use std::io::Read;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use herostore_core::{ExportError, ExportFormat, StockCondition, ValidationError};
use herostore_db::Database;

use crate::config::AppConfig;
use crate::error::ApiError;

pub const USAGE: &str = "\
Usage: herostore <COMMAND>

Commands:
  products [all|available|unavailable]         List products (default: all)
  products export <csv|excel> [condition] [out-file]
                                               Export products
  product get <id>                             Show one product
  product create <json-file|->                 Create a product
  product update <id> <json-file|->            Replace a product's fields
  product delete <id>                          Delete a product
  product-types                                List product types
  product-types export <csv|excel> [out-file]  Export product types
  product-type get <id>                        Show one product type
  product-type create <json-file|->            Create a product type
  product-type update <id> <json-file|->       Rename a product type
  product-type delete <id>                     Delete a product type and its products
  order <json-file|->                          Register an order from a JSON body
  orders [id]                                  List orders newest first, or show one
  export <csv|excel|pdf> [out-file]            Export every order
  help                                         Show this help message

Formats:
  csv     Comma separated values (.csv)
  excel   SpreadsheetML 2003 workbook (.xls); 'xls' and 'xlsx' are accepted
          as aliases and produce the same .xls file
  pdf     Report for orders only (.pdf)

Environment:
  HEROSTORE_DB_PATH, HEROSTORE_MAX_CONNECTIONS, HEROSTORE_STORE_NAME,
  HEROSTORE_EXPORT_DIR, RUST_LOG";

/// Single-record operations shared by `product` and `product-type`.
///
/// Request bodies are given as a file path, or `-` for stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Get(i64),
    Create(String),
    Update(i64, String),
    Delete(i64),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Products(StockCondition),
    ExportProducts {
        format: ExportFormat,
        condition: StockCondition,
        out: Option<PathBuf>,
    },
    Product(Action),
    ProductTypes,
    ExportProductTypes {
        format: ExportFormat,
        out: Option<PathBuf>,
    },
    ProductType(Action),
    /// Path of the request body, or `-` for stdin
    Order(String),
    Orders(Option<String>),
    Export {
        format: ExportFormat,
        out: Option<PathBuf>,
    },
    Help,
}

/// The command line could not be understood.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("invalid id '{0}'")]
    InvalidId(String),

    #[error("unknown action '{0}' (expected get, create, update or delete)")]
    UnknownAction(String),

    #[error("invalid stock condition: {0}")]
    InvalidCondition(#[from] ValidationError),

    #[error(transparent)]
    InvalidFormat(#[from] ExportError),
}

impl Command {
    /// Parses the arguments after the program name.
    pub fn parse<I, S>(args: I) -> Result<Command, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut rest = args.iter().map(String::as_str);

        let command = match rest.next() {
            None => return Err(UsageError::MissingCommand),
            Some("products") => match rest.next() {
                Some("export") => {
                    let format = parse_format(rest.next())?;
                    let (condition, out) = match rest.next() {
                        Some(arg) => match arg.parse::<StockCondition>() {
                            Ok(condition) => (condition, rest.next().map(PathBuf::from)),
                            Err(_) => (StockCondition::All, Some(PathBuf::from(arg))),
                        },
                        None => (StockCondition::All, None),
                    };
                    Command::ExportProducts { format, condition, out }
                }
                Some(c) => Command::Products(c.parse::<StockCondition>()?),
                None => Command::Products(StockCondition::All),
            },
            Some("product") => Command::Product(parse_action(&mut rest)?),
            Some("product-types") => match rest.next() {
                Some("export") => Command::ExportProductTypes {
                    format: parse_format(rest.next())?,
                    out: rest.next().map(PathBuf::from),
                },
                Some(other) => return Err(UsageError::UnexpectedArgument(other.to_string())),
                None => Command::ProductTypes,
            },
            Some("product-type") => Command::ProductType(parse_action(&mut rest)?),
            Some("order") => {
                let source = rest.next().ok_or(UsageError::MissingArgument("json-file|-"))?;
                Command::Order(source.to_string())
            }
            Some("orders") => Command::Orders(rest.next().map(str::to_string)),
            Some("export") => Command::Export {
                format: parse_format(rest.next())?,
                out: rest.next().map(PathBuf::from),
            },
            Some("help" | "--help" | "-h") => Command::Help,
            Some(other) => return Err(UsageError::UnknownCommand(other.to_string())),
        };

        if let Some(extra) = rest.next() {
            return Err(UsageError::UnexpectedArgument(extra.to_string()));
        }
        Ok(command)
    }

    /// Path reported in error bodies.
    pub fn path(&self) -> String {
        match self {
            Command::Products(condition) => format!("herostore products {}", condition.as_str()),
            Command::ExportProducts { format, .. } => format!("herostore products export {}", format.extension()),
            Command::Product(action) => format!("herostore product {}", action.path()),
            Command::ProductTypes => "herostore product-types".to_string(),
            Command::ExportProductTypes { format, .. } => {
                format!("herostore product-types export {}", format.extension())
            }
            Command::ProductType(action) => format!("herostore product-type {}", action.path()),
            Command::Order(_) => "herostore order".to_string(),
            Command::Orders(None) => "herostore orders".to_string(),
            Command::Orders(Some(id)) => format!("herostore orders {}", id),
            Command::Export { format, .. } => format!("herostore export {}", format.extension()),
            Command::Help => "herostore help".to_string(),
        }
    }
}

impl Action {
    fn path(&self) -> String {
        match self {
            Action::Get(id) => format!("get {}", id),
            Action::Create(_) => "create".to_string(),
            Action::Update(id, _) => format!("update {}", id),
            Action::Delete(id) => format!("delete {}", id),
        }
    }
}

fn parse_format(arg: Option<&str>) -> Result<ExportFormat, UsageError> {
    Ok(arg.ok_or(UsageError::MissingArgument("csv|excel|pdf"))?.parse::<ExportFormat>()?)
}

fn parse_id(arg: Option<&str>) -> Result<i64, UsageError> {
    let arg = arg.ok_or(UsageError::MissingArgument("id"))?;
    arg.parse().map_err(|_| UsageError::InvalidId(arg.to_string()))
}

fn parse_action<'a>(rest: &mut impl Iterator<Item = &'a str>) -> Result<Action, UsageError> {
    match rest.next() {
        Some("get") => Ok(Action::Get(parse_id(rest.next())?)),
        Some("create") => {
            let source = rest.next().ok_or(UsageError::MissingArgument("json-file|-"))?;
            Ok(Action::Create(source.to_string()))
        }
        Some("update") => {
            let id = parse_id(rest.next())?;
            let source = rest.next().ok_or(UsageError::MissingArgument("json-file|-"))?;
            Ok(Action::Update(id, source.to_string()))
        }
        Some("delete") => Ok(Action::Delete(parse_id(rest.next())?)),
        Some(other) => Err(UsageError::UnknownAction(other.to_string())),
        None => Err(UsageError::MissingArgument("get|create|update|delete")),
    }
}

/// Reads a JSON body from a file, or from stdin when `source` is `-`.
///
/// Unreadable input and malformed JSON are both `400 Bad Request`.
pub fn read_json<T: DeserializeOwned>(source: &str, what: &str) -> Result<T, ApiError> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| ApiError::bad_request(format!("Couldn't read {} from stdin: {}", what, e)))?;
        buf
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| ApiError::bad_request(format!("Couldn't read {} from {}: {}", what, source, e)))?
    };

    parse_json(&text, what)
}

/// Parses a JSON body.
pub fn parse_json<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::bad_request(format!("Malformed {}: {}", what, e)))
}

/// Runs a command and returns its JSON response.
pub async fn execute(command: Command, db: &Database, config: &AppConfig) -> Result<serde_json::Value, ApiError> {
    match command {
        Command::Products(condition) => to_json(product::list_products(db, condition).await?),
        Command::ExportProducts { format, condition, out } => {
            let destination =
                out.unwrap_or_else(|| export::default_destination(&config.export_dir, "products", format));
            to_json(export::export_products(db, format, condition, &destination).await?)
        }
        Command::Product(action) => match action {
            Action::Get(id) => to_json(product::get_product(db, id).await?),
            Action::Create(source) => to_json(product::create_product(db, &read_json(&source, "product")?).await?),
            Action::Update(id, source) => {
                to_json(product::update_product(db, id, &read_json(&source, "product")?).await?)
            }
            Action::Delete(id) => to_json(product::delete_product(db, id).await?),
        },
        Command::ProductTypes => to_json(product_type::list_product_types(db).await?),
        Command::ExportProductTypes { format, out } => {
            let destination =
                out.unwrap_or_else(|| export::default_destination(&config.export_dir, "product-types", format));
            to_json(export::export_product_types(db, format, &destination).await?)
        }
        Command::ProductType(action) => match action {
            Action::Get(id) => to_json(product_type::get_product_type(db, id).await?),
            Action::Create(source) => {
                to_json(product_type::create_product_type(db, &read_json(&source, "product type")?).await?)
            }
            Action::Update(id, source) => {
                to_json(product_type::update_product_type(db, id, &read_json(&source, "product type")?).await?)
            }
            Action::Delete(id) => to_json(product_type::delete_product_type(db, id).await?),
        },
        Command::Order(source) => {
            let request = order::read_request(&source)?;
            to_json(order::register_order(db, &request).await?)
        }
        Command::Orders(None) => to_json(order::list_orders(db).await?),
        Command::Orders(Some(id)) => to_json(order::get_order(db, &id).await?),
        Command::Export { format, out } => {
            let destination = out.unwrap_or_else(|| export::default_destination(&config.export_dir, "orders", format));
            to_json(export::export_orders(db, &config.store_name, format, &destination).await?)
        }
        Command::Help => Ok(serde_json::Value::String(USAGE.to_string())),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::internal)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(["products"]).unwrap(), Command::Products(StockCondition::All));
        assert_eq!(
            Command::parse(["products", "available"]).unwrap(),
            Command::Products(StockCondition::Available)
        );
        assert_eq!(Command::parse(["order", "-"]).unwrap(), Command::Order("-".to_string()));
        assert_eq!(Command::parse(["orders"]).unwrap(), Command::Orders(None));
        assert_eq!(
            Command::parse(["export", "excel", "out.xls"]).unwrap(),
            Command::Export {
                format: ExportFormat::Excel,
                out: Some(PathBuf::from("out.xls")),
            }
        );
        assert_eq!(Command::parse(["--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_catalog_commands() {
        assert_eq!(Command::parse(["product", "get", "3"]).unwrap(), Command::Product(Action::Get(3)));
        assert_eq!(
            Command::parse(["product", "update", "3", "body.json"]).unwrap(),
            Command::Product(Action::Update(3, "body.json".to_string()))
        );
        assert_eq!(
            Command::parse(["product-type", "create", "-"]).unwrap(),
            Command::ProductType(Action::Create("-".to_string()))
        );
        assert_eq!(
            Command::parse(["product-type", "delete", "2"]).unwrap(),
            Command::ProductType(Action::Delete(2))
        );
        assert_eq!(Command::parse(["product-types"]).unwrap(), Command::ProductTypes);
        assert_eq!(
            Command::parse(["product-types", "export", "csv"]).unwrap(),
            Command::ExportProductTypes {
                format: ExportFormat::Csv,
                out: None,
            }
        );
        assert_eq!(
            Command::parse(["products", "export", "excel", "available", "stock.xls"]).unwrap(),
            Command::ExportProducts {
                format: ExportFormat::Excel,
                condition: StockCondition::Available,
                out: Some(PathBuf::from("stock.xls")),
            }
        );
        assert_eq!(
            Command::parse(["products", "export", "csv", "all-products.csv"]).unwrap(),
            Command::ExportProducts {
                format: ExportFormat::Csv,
                condition: StockCondition::All,
                out: Some(PathBuf::from("all-products.csv")),
            }
        );
    }

    #[test]
    fn test_parse_catalog_errors() {
        assert!(matches!(Command::parse(["product", "get", "one"]), Err(UsageError::InvalidId(_))));
        assert!(matches!(Command::parse(["product", "rename", "1"]), Err(UsageError::UnknownAction(_))));
        assert!(matches!(Command::parse(["product", "update", "1"]), Err(UsageError::MissingArgument(_))));
        assert!(matches!(Command::parse(["product-type"]), Err(UsageError::MissingArgument(_))));
        assert!(matches!(Command::parse(["product-types", "all"]), Err(UsageError::UnexpectedArgument(_))));
    }

    #[test]
    fn test_usage_documents_excel_aliases() {
        assert!(USAGE.contains("'xls' and 'xlsx' are accepted"));
        assert!(USAGE.contains("SpreadsheetML 2003 workbook (.xls)"));
        assert_eq!(
            Command::parse(["export", "xlsx"]).unwrap(),
            Command::Export {
                format: ExportFormat::Excel,
                out: None,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let none: [&str; 0] = [];
        assert!(matches!(Command::parse(none), Err(UsageError::MissingCommand)));
        assert!(matches!(Command::parse(["refund"]), Err(UsageError::UnknownCommand(_))));
        assert!(matches!(Command::parse(["order"]), Err(UsageError::MissingArgument(_))));
        assert!(matches!(Command::parse(["products", "some"]), Err(UsageError::InvalidCondition(_))));
        assert!(matches!(Command::parse(["export", "docx"]), Err(UsageError::InvalidFormat(_))));
        assert!(matches!(
            Command::parse(["orders", "a", "b"]),
            Err(UsageError::UnexpectedArgument(ref a)) if a == "b"
        ));
    }

    #[test]
    fn test_path() {
        assert_eq!(Command::Products(StockCondition::Unavailable).path(), "herostore products unavailable");
        assert_eq!(Command::Orders(Some("o-1".into())).path(), "herostore orders o-1");
        assert_eq!(Command::Product(Action::Delete(4)).path(), "herostore product delete 4");
        assert_eq!(
            Command::ProductType(Action::Create("-".into())).path(),
            "herostore product-type create"
        );
    }

    #[tokio::test]
    async fn test_execute_products() {
        let db = test_support::database().await;
        let config = AppConfig::from_lookup(|key| (key == "HEROSTORE_DB_PATH").then(|| ":memory:".to_string())).unwrap();

        let json = execute(Command::Products(StockCondition::Unavailable), &db, &config).await.unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["name"], "Hulk Mug");
    }
}
