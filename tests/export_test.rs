use tempfile::TempDir;

use trakui::columns::derive_columns;
use trakui::export::{document_bytes, write_export, xlsx_bytes, ExportFormat};
use trakui::rows::Row;

mod common;

fn columns_and_refs(rows: &[Row]) -> (Vec<trakui::columns::Column>, Vec<&Row>) {
    let columns = derive_columns(rows, &[]);
    let refs: Vec<&Row> = rows.iter().collect();
    (columns, refs)
}

#[test]
fn test_zero_rows_export_is_a_no_op() {
    let rows = common::order_rows();
    let (columns, _) = columns_and_refs(&rows);

    assert!(xlsx_bytes(&columns, &[]).unwrap().is_none());
    assert!(document_bytes("Orders", &columns, &[], 40).unwrap().is_none());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");
    let written = write_export(ExportFormat::Xlsx, &path, "Orders", &columns, &[], 40).unwrap();
    assert!(!written);
    assert!(!path.exists());
}

#[test]
fn test_xlsx_bytes_look_like_a_workbook() {
    let rows = common::order_rows();
    let (columns, refs) = columns_and_refs(&rows);
    let bytes = xlsx_bytes(&columns, &refs).unwrap().expect("bytes");
    // XLSX is a zip container: PK magic
    assert!(bytes.len() > 4);
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn test_document_paginates_with_repeated_headers() {
    let rows = common::order_rows();
    let (columns, refs) = columns_and_refs(&rows);

    // 3 rows at 2 per page: 2 pages separated by a form feed
    let bytes = document_bytes("Orders", &columns, &refs, 2)
        .unwrap()
        .expect("bytes");
    let text = String::from_utf8(bytes).unwrap();

    assert_eq!(text.matches('\u{c}').count(), 1);
    assert_eq!(text.matches("ORDER NO").count(), 2);
    assert!(text.contains("Page 1 of 2"));
    assert!(text.contains("Page 2 of 2"));
    assert!(text.contains("HF-1042"));
    assert!(text.contains("HF-1044"));
}

#[test]
fn test_document_single_page() {
    let rows = common::order_rows();
    let (columns, refs) = columns_and_refs(&rows);
    let bytes = document_bytes("Orders", &columns, &refs, 40)
        .unwrap()
        .expect("bytes");
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.matches('\u{c}').count(), 0);
    assert!(text.contains("Page 1 of 1"));
    assert!(text.starts_with("Orders\n"));
}

#[test]
fn test_document_renders_null_cells_as_blank() {
    let rows = common::order_rows();
    let (columns, refs) = columns_and_refs(&rows);
    let bytes = document_bytes("Orders", &columns, &refs, 40)
        .unwrap()
        .expect("bytes");
    let text = String::from_utf8(bytes).unwrap();
    // The third row's image path is null; the word "null" must never render.
    assert!(!text.contains("null"));
}

#[test]
fn test_write_export_produces_a_file() {
    let rows = common::order_rows();
    let (columns, refs) = columns_and_refs(&rows);
    let dir = TempDir::new().unwrap();

    let path = dir.path().join("orders.xlsx");
    let written =
        write_export(ExportFormat::Xlsx, &path, "Orders", &columns, &refs, 40).unwrap();
    assert!(written);
    assert!(path.exists());

    let path = dir.path().join("orders.txt");
    let written =
        write_export(ExportFormat::Document, &path, "Orders", &columns, &refs, 40).unwrap();
    assert!(written);
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("BUYER"));
}
