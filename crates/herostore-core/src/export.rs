//! # Export
//!
//! Renders orders, products and product types as CSV, an Excel workbook or
//! a PDF report.
//!
//! ## Strategy Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "csv" | "excel" (alias "xls", "xlsx") | "pdf"                          │
//! │       │ ExportFormat::from_str                                          │
//! │       ▼                                                                 │
//! │  ExportFormat::Csv ──► CsvExporter   ─┐                                 │
//! │  ExportFormat::Excel ► ExcelExporter ─┼─► render(&[Order]) -> Vec<u8>   │
//! │  ExportFormat::Pdf ──► PdfExporter   ─┘                                 │
//! │                                                                         │
//! │  Products and product types go through ExportFormat::render_table,      │
//! │  which has no PDF layout.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The Excel format is a SpreadsheetML 2003 workbook saved as `.xls`. It is
//! what `xlsx` selects as well; no OOXML package is produced.
//!
//! Exporters only read records. They never touch stock or the engine.

use std::fmt::Write as _;
use std::str::FromStr;

use thiserror::Error;

use crate::money::Money;
use crate::order::{LineItem, Order, OrderLine};
use crate::types::{Product, ProductType};

/// Date format used in the PDF report.
const REPORT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0} (expected csv, excel or pdf)")]
    UnsupportedFormat(String),

    /// The format exists but has no layout for this kind of record.
    #[error("{format} export is not available for {sheet}")]
    NotAvailable { format: &'static str, sheet: &'static str },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to render export: {0}")]
    Render(#[from] std::fmt::Error),
}

// =============================================================================
// Format
// =============================================================================

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    /// SpreadsheetML 2003, written with an `.xls` extension.
    Excel,
    Pdf,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// MIME type of the rendered bytes.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => "application/vnd.ms-excel",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// `file_name("orders")` → `orders.csv`.
    pub fn file_name(&self, base: &str) -> String {
        format!("{}.{}", base, self.extension())
    }

    /// Returns the order renderer for this format.
    pub fn exporter(&self, store_name: &str) -> Box<dyn OrderExporter> {
        match self {
            ExportFormat::Csv => Box::new(CsvExporter),
            ExportFormat::Excel => Box::new(ExcelExporter),
            ExportFormat::Pdf => Box::new(PdfExporter::new(store_name)),
        }
    }

    /// Renders catalog records. Only the tabular formats apply.
    ///
    /// ## Errors
    /// - `NotAvailable` for PDF
    pub fn render_table<T: Tabular>(&self, records: &[T]) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Csv => CsvExporter.table(records),
            ExportFormat::Excel => ExcelExporter.table(records),
            ExportFormat::Pdf => Err(ExportError::NotAvailable {
                format: "pdf",
                sheet: T::SHEET,
            }),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xls" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// A kind of record that can be laid out as a table.
pub trait Tabular {
    /// Worksheet name, also used in error messages.
    const SHEET: &'static str;

    /// Column headings.
    const COLUMNS: &'static [&'static str];

    /// Columns written as numbers in a workbook.
    const NUMERIC_COLUMNS: &'static [usize];

    /// Rows contributed by this record, each `COLUMNS.len()` wide.
    fn rows(&self) -> Vec<Vec<String>>;
}

/// One row per order line, with the order's id, date and total repeated.
impl Tabular for Order<OrderLine> {
    const SHEET: &'static str = "Orders";
    const COLUMNS: &'static [&'static str] = &[
        "Order ID",
        "Created At",
        "Line ID",
        "Product ID",
        "Product",
        "Price",
        "Quantity",
        "Line Total",
        "Order Total",
    ];
    const NUMERIC_COLUMNS: &'static [usize] = &[3, 5, 6, 7, 8];

    fn rows(&self) -> Vec<Vec<String>> {
        self.lines()
            .iter()
            .map(|line| {
                vec![
                    self.id().to_string(),
                    self.created_at().to_rfc3339(),
                    line.id().to_string(),
                    line.product().id().to_string(),
                    line.product().name().to_string(),
                    line.product().price().to_string(),
                    line.quantity().to_string(),
                    line.total().amount().to_string(),
                    self.total().amount().to_string(),
                ]
            })
            .collect()
    }
}

impl Tabular for Product {
    const SHEET: &'static str = "Products";
    const COLUMNS: &'static [&'static str] = &["ID", "Name", "Product Type", "Price", "Stock"];
    const NUMERIC_COLUMNS: &'static [usize] = &[0, 3, 4];

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id().to_string(),
            self.name().to_string(),
            self.product_type().name().to_string(),
            self.price().to_string(),
            self.stock().to_string(),
        ]]
    }
}

impl Tabular for ProductType {
    const SHEET: &'static str = "Product Types";
    const COLUMNS: &'static [&'static str] = &["ID", "Name"];
    const NUMERIC_COLUMNS: &'static [usize] = &[0];

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.id().to_string(), self.name().to_string()]]
    }
}

// =============================================================================
// Exporter Trait
// =============================================================================

/// Renders a list of orders into a file body.
pub trait OrderExporter {
    fn render(&self, orders: &[Order<OrderLine>]) -> Result<Vec<u8>, ExportError>;
}

// =============================================================================
// CSV
// =============================================================================

/// Comma separated values, quoted only where needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn table<T: Tabular>(&self, records: &[T]) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(T::COLUMNS)?;

        for record in records {
            for row in record.rows() {
                writer.write_record(&row)?;
            }
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
    }
}

impl OrderExporter for CsvExporter {
    fn render(&self, orders: &[Order<OrderLine>]) -> Result<Vec<u8>, ExportError> {
        self.table(orders)
    }
}

// =============================================================================
// Excel
// =============================================================================

/// SpreadsheetML 2003 workbook with a single worksheet named after the
/// record kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelExporter;

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl ExcelExporter {
    pub fn table<T: Tabular>(&self, records: &[T]) -> Result<Vec<u8>, ExportError> {
        let mut out = String::new();
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(out, r#"<?mso-application progid="Excel.Sheet"?>"#)?;
        writeln!(
            out,
            r#"<Workbook xmlns="urn:schemas-microsoft-com:office:spreadsheet" xmlns:ss="urn:schemas-microsoft-com:office:spreadsheet">"#
        )?;
        writeln!(out, r#"<Worksheet ss:Name="{}"><Table>"#, xml_escape(T::SHEET))?;

        out.push_str("<Row>");
        for heading in T::COLUMNS {
            write!(out, r#"<Cell><Data ss:Type="String">{}</Data></Cell>"#, xml_escape(heading))?;
        }
        out.push_str("</Row>\n");

        for row in records.iter().flat_map(|record| record.rows()) {
            out.push_str("<Row>");
            for (index, value) in row.iter().enumerate() {
                let kind = if T::NUMERIC_COLUMNS.contains(&index) { "Number" } else { "String" };
                write!(out, r#"<Cell><Data ss:Type="{}">{}</Data></Cell>"#, kind, xml_escape(value))?;
            }
            out.push_str("</Row>\n");
        }

        writeln!(out, "</Table></Worksheet>")?;
        writeln!(out, "</Workbook>")?;
        Ok(out.into_bytes())
    }
}

impl OrderExporter for ExcelExporter {
    fn render(&self, orders: &[Order<OrderLine>]) -> Result<Vec<u8>, ExportError> {
        self.table(orders)
    }
}

// =============================================================================
// PDF
// =============================================================================

/// Plain text report laid out on A4 pages with the built-in Helvetica font.
///
/// ## Layout
/// ```text
/// Hero Store
///
/// Product Order: 5f0c...
/// Date: 04/05/2024 13:30
/// Order ID | Product | Price | Quantity | Order total
/// 5f0c...  | Iron Man Cup | $25.00 | 3 | $75.00
/// Total: $75.00
/// ```
#[derive(Debug, Clone)]
pub struct PdfExporter {
    title: String,
}

const PDF_LINES_PER_PAGE: usize = 48;
const PDF_FONT_SIZE: u32 = 11;
const PDF_LEADING: u32 = 15;
const PDF_MARGIN_LEFT: u32 = 50;
const PDF_TOP: u32 = 800;

impl PdfExporter {
    pub fn new(title: impl Into<String>) -> Self {
        PdfExporter { title: title.into() }
    }

    fn report_lines(&self, orders: &[Order<OrderLine>]) -> Vec<String> {
        let mut lines = vec![self.title.clone(), String::new()];

        for order in orders {
            lines.push(format!("Product Order: {}", order.id()));
            lines.push(format!("Date: {}", order.created_at().format(REPORT_DATE_FORMAT)));
            lines.push("Order ID | Product | Price | Quantity | Order total".to_string());
            for line in order.lines() {
                lines.push(format!(
                    "{} | {} | {} | {} | {}",
                    order.id(),
                    line.product().name(),
                    Money::new(line.product().price()),
                    line.quantity(),
                    line.total(),
                ));
            }
            lines.push(format!("Total: {}", order.total()));
            lines.push(String::new());
        }

        lines
    }
}

/// Escapes a string for a PDF literal. Characters outside ASCII are
/// replaced because the standard fonts only cover a single-byte encoding.
fn pdf_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

impl OrderExporter for PdfExporter {
    fn render(&self, orders: &[Order<OrderLine>]) -> Result<Vec<u8>, ExportError> {
        let lines = self.report_lines(orders);
        let pages: Vec<&[String]> = lines.chunks(PDF_LINES_PER_PAGE).collect();

        // Objects: 1 catalog, 2 page tree, 3 font, then (page, content) pairs
        let page_object = |index: usize| 4 + index * 2;
        let mut objects: Vec<String> = Vec::with_capacity(3 + pages.len() * 2);

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_object(i))).collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ));
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string());

        for (index, page) in pages.iter().enumerate() {
            let mut stream = String::new();
            write!(
                stream,
                "BT /F1 {} Tf {} TL {} {} Td",
                PDF_FONT_SIZE, PDF_LEADING, PDF_MARGIN_LEFT, PDF_TOP
            )?;
            for text in page.iter() {
                write!(stream, " ({}) '", pdf_text(text))?;
            }
            stream.push_str(" ET");

            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_object(index) + 1
            ));
            objects.push(format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            write!(out, "{} 0 obj\n{}\nendobj\n", index + 1, body)?;
        }

        let xref_offset = out.len();
        write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1)?;
        for offset in offsets {
            write!(out, "{:010} 00000 n \n", offset)?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )?;

        Ok(out.into_bytes())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
