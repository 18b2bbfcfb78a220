//! Column derivation from row key sets.

use crate::rows::Row;

/// Renderer selection for a column, decided once at derivation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Highlighted text cells.
    Text,
    /// Image locator cells; shown as a dimmed basename, opened in a popup.
    Image,
}

/// A display column projected from one row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
}

/// Turn a row key into its display label: underscores become spaces, then
/// upper-cased.
fn display_label(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

/// Derive display columns from the first row's key set, in its insertion
/// order. Later rows contribute no columns (keys present only on later rows
/// are never rendered), and an empty row set derives an empty column list.
///
/// `image_keys` is the configured predicate for image columns, compared
/// case-insensitively against the row key.
pub fn derive_columns(rows: &[Row], image_keys: &[String]) -> Vec<Column> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .keys()
        .map(|key| {
            let kind = if image_keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                ColumnKind::Image
            } else {
                ColumnKind::Text
            };
            Column {
                key: key.clone(),
                label: display_label(key),
                kind,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_label_transform() {
        assert_eq!(display_label("o_style_desc"), "O STYLE DESC");
        assert_eq!(display_label("uom"), "UOM");
    }

    #[test]
    fn test_empty_rows_derive_no_columns() {
        assert!(derive_columns(&[], &[]).is_empty());
    }

    #[test]
    fn test_image_predicate_is_case_insensitive() {
        let rows = rows(json!([{"MainImagePath": "a.jpg", "order_no": "1"}]));
        let image_keys = vec!["mainimagepath".to_string()];
        let columns = derive_columns(&rows, &image_keys);
        assert_eq!(columns[0].kind, ColumnKind::Image);
        assert_eq!(columns[1].kind, ColumnKind::Text);
    }

    #[test]
    fn test_first_row_keys_win() {
        let rows = rows(json!([{"a": 1, "b": 2}, {"a": 3, "c": 4}]));
        let columns = derive_columns(&rows, &[]);
        let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
    }
}
