//! Export serializers for the grid's filtered rows.
//!
//! Serializers receive data only: the displayed column list and the rows
//! that currently pass the filters. An empty row set produces no bytes and
//! no error; the caller simply has nothing to write.

use std::path::Path;

use chrono::Local;
use color_eyre::Result;
use rust_xlsxwriter::{Format, Workbook};
use serde_json::Value;

use crate::columns::Column;
use crate::rows::{cell_text, Row};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Document,
}

impl ExportFormat {
    pub const ALL: [Self; 2] = [Self::Xlsx, Self::Document];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xlsx => "XLSX",
            Self::Document => "Document",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Document => "txt",
        }
    }
}

/// Rows per page of the document export when the config carries none.
pub const DEFAULT_DOCUMENT_ROWS_PER_PAGE: usize = 40;

/// Timestamped default filename offered by the export modal.
pub fn default_filename(view: &str, format: ExportFormat) -> String {
    let slug: String = view
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    format!("{}_{}.{}", slug, stamp, format.extension())
}

/// Serialize the visible rows to an XLSX workbook in memory. Returns
/// `Ok(None)` when there is nothing to export.
pub fn xlsx_bytes(columns: &[Column], rows: &[&Row]) -> Result<Option<Vec<u8>>> {
    if columns.is_empty() || rows.is_empty() {
        return Ok(None);
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();

    for (c, column) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, &column.label, &header)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, column) in columns.iter().enumerate() {
            // Numbers stay numbers so spreadsheet formulas keep working;
            // everything else goes through the cell's display text.
            if let Some(Value::Number(n)) = row.get(&column.key) {
                if let Some(f) = n.as_f64() {
                    worksheet.write_number(r as u32 + 1, c as u16, f)?;
                    continue;
                }
            }
            worksheet.write_string(r as u32 + 1, c as u16, cell_text(row, &column.key))?;
        }
    }

    Ok(Some(workbook.save_to_buffer()?))
}

/// Serialize the visible rows to a paginated plain-text report: title and
/// generation stamp on every page, the column header repeated per page, a
/// fixed number of rows per page, and a `Page n of m` footer. Pages are
/// separated by form feeds. Returns `Ok(None)` when there is nothing to
/// export.
pub fn document_bytes(
    title: &str,
    columns: &[Column],
    rows: &[&Row],
    rows_per_page: usize,
) -> Result<Option<Vec<u8>>> {
    if columns.is_empty() || rows.is_empty() {
        return Ok(None);
    }
    let rows_per_page = rows_per_page.max(1);

    // Fit every column to its widest cell so all pages align the same way.
    let mut widths: Vec<usize> = columns.iter().map(|c| c.label.chars().count()).collect();
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| cell_text(row, &c.key))
                .collect::<Vec<_>>()
        })
        .collect();
    for line in &table {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let total_pages = table.len().div_ceil(rows_per_page);
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S");
    let header: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

    let mut out = String::new();
    for (page, chunk) in table.chunks(rows_per_page).enumerate() {
        if page > 0 {
            out.push('\u{c}');
        }
        out.push_str(&format!("{}\nGenerated {}\n\n", title, generated));
        out.push_str(&padded_line(&header, &widths));
        out.push_str(&"-".repeat(rule_width));
        out.push('\n');
        for line in chunk {
            out.push_str(&padded_line(line, &widths));
        }
        out.push_str(&format!("\nPage {} of {}\n", page + 1, total_pages));
    }

    Ok(Some(out.into_bytes()))
}

fn padded_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let pad = widths[i].saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat(' ').take(pad));
    }
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

/// Write an export to `path`. Returns `true` when a file was produced;
/// `false` means the row set was empty and nothing was written.
pub fn write_export(
    format: ExportFormat,
    path: &Path,
    title: &str,
    columns: &[Column],
    rows: &[&Row],
    rows_per_page: usize,
) -> Result<bool> {
    let bytes = match format {
        ExportFormat::Xlsx => xlsx_bytes(columns, rows)?,
        ExportFormat::Document => document_bytes(title, columns, rows, rows_per_page)?,
    };
    match bytes {
        Some(bytes) => {
            std::fs::write(path, bytes)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_labels_and_extensions() {
        assert_eq!(ExportFormat::Xlsx.as_str(), "XLSX");
        assert_eq!(ExportFormat::Xlsx.extension(), "xlsx");
        assert_eq!(ExportFormat::Document.as_str(), "Document");
        assert_eq!(ExportFormat::Document.extension(), "txt");
    }

    #[test]
    fn test_default_filename_is_slugged() {
        let name = default_filename("Server 11", ExportFormat::Xlsx);
        assert!(name.starts_with("server_11_"));
        assert!(name.ends_with(".xlsx"));
    }
}
