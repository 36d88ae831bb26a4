//! # Export Commands
//!
//! Writes every stored order to a CSV, Excel or PDF file, and the catalog
//! (products or product types) to a CSV or Excel file.

use std::path::{Path, PathBuf};

use tracing::info;

use herostore_core::{ExportFormat, StockCondition};
use herostore_db::Database;

use crate::dto::ExportSummary;
use crate::error::ApiError;

/// `<export_dir>/<base>.<ext>`
pub fn default_destination(export_dir: &Path, base: &str, format: ExportFormat) -> PathBuf {
    export_dir.join(format.file_name(base))
}

fn write_export(
    format: ExportFormat,
    destination: &Path,
    bytes: &[u8],
    records: usize,
) -> Result<ExportSummary, ApiError> {
    std::fs::write(destination, bytes)?;

    Ok(ExportSummary {
        format: format.extension().to_string(),
        content_type: format.content_type().to_string(),
        path: destination.display().to_string(),
        records,
        bytes: bytes.len(),
    })
}

/// Renders all orders in `format` and writes them to `destination`.
pub async fn export_orders(
    db: &Database,
    store_name: &str,
    format: ExportFormat,
    destination: &Path,
) -> Result<ExportSummary, ApiError> {
    let orders = db.order_service().list_orders().await?;
    let bytes = format.exporter(store_name).render(&orders)?;
    let summary = write_export(format, destination, &bytes, orders.len())?;

    info!(
        path = %summary.path,
        orders = summary.records,
        bytes = summary.bytes,
        "Orders exported"
    );
    Ok(summary)
}

/// Writes the products matching `condition`. PDF is not offered for the catalog.
pub async fn export_products(
    db: &Database,
    format: ExportFormat,
    condition: StockCondition,
    destination: &Path,
) -> Result<ExportSummary, ApiError> {
    let products = db.products().list(condition).await?;
    let bytes = format.render_table(&products)?;
    let summary = write_export(format, destination, &bytes, products.len())?;

    info!(
        path = %summary.path,
        condition = condition.as_str(),
        products = summary.records,
        "Products exported"
    );
    Ok(summary)
}

pub async fn export_product_types(
    db: &Database,
    format: ExportFormat,
    destination: &Path,
) -> Result<ExportSummary, ApiError> {
    let types = db.product_types().list().await?;
    let bytes = format.render_table(&types)?;
    let summary = write_export(format, destination, &bytes, types.len())?;

    info!(path = %summary.path, product_types = summary.records, "Product types exported");
    Ok(summary)
}
