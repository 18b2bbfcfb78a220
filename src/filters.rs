//! Per-column filter state and row visibility.

use std::collections::HashMap;

use crate::columns::Column;
use crate::rows::{cell_text, Row};

/// Value carried by one column's active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    /// A multi-select filter's chosen values. Matching and highlighting use
    /// the first selected value, a deliberate simplification of multi-select
    /// semantics.
    Selection(Vec<String>),
}

impl FilterValue {
    /// The single pattern this filter contributes to matching and
    /// highlighting.
    pub fn pattern(&self) -> &str {
        match self {
            FilterValue::Text(s) => s,
            FilterValue::Selection(values) => {
                values.first().map(String::as_str).unwrap_or_default()
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.pattern().is_empty()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Mapping from column key to its active filter.
///
/// Columns with no active filter are absent from the mapping (not present
/// with an empty string), so downstream code can tell "no filter" apart from
/// "filter cleared mid-edit".
#[derive(Debug, Default, Clone)]
pub struct ColumnFilters {
    active: HashMap<String, FilterValue>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a filter change for `column`. An empty value removes the entry.
    pub fn set(&mut self, column: &str, value: FilterValue) {
        if value.is_empty() {
            self.active.remove(column);
        } else {
            self.active.insert(column.to_string(), value);
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// The highlight pattern for `column`, when it has an active filter.
    pub fn pattern_for(&self, column: &str) -> Option<&str> {
        self.active.get(column).map(FilterValue::pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// A row is visible when every active column filter's pattern is a
    /// case-insensitive substring of that column's cell text, and the global
    /// term, when non-empty, is contained in at least one cell.
    pub fn row_visible(&self, row: &Row, columns: &[Column], global_search: &str) -> bool {
        for (column, value) in &self.active {
            if !contains_ci(&cell_text(row, column), value.pattern()) {
                return false;
            }
        }
        if !global_search.is_empty() {
            return columns
                .iter()
                .any(|c| contains_ci(&cell_text(row, &c.key), global_search));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::derive_columns;
    use serde_json::json;

    fn sample() -> (Vec<Row>, Vec<Column>) {
        let rows: Vec<Row> = serde_json::from_value(json!([
            {"order_no": "HF-1042", "buyer": "Northwear", "status": "Pending"},
            {"order_no": "HF-1043", "buyer": "Coastline", "status": "Shipped"},
        ]))
        .unwrap();
        let columns = derive_columns(&rows, &[]);
        (rows, columns)
    }

    #[test]
    fn test_empty_value_removes_entry() {
        let mut filters = ColumnFilters::new();
        filters.set("status", FilterValue::Text("pend".to_string()));
        assert_eq!(filters.pattern_for("status"), Some("pend"));

        filters.set("status", FilterValue::Text(String::new()));
        assert!(filters.pattern_for("status").is_none());
        assert!(filters.is_empty());
    }

    #[test]
    fn test_selection_uses_first_value() {
        let mut filters = ColumnFilters::new();
        filters.set(
            "status",
            FilterValue::Selection(vec!["Shipped".to_string(), "Pending".to_string()]),
        );
        assert_eq!(filters.pattern_for("status"), Some("Shipped"));

        filters.set("status", FilterValue::Selection(Vec::new()));
        assert!(filters.pattern_for("status").is_none());
    }

    #[test]
    fn test_column_filters_are_a_conjunction() {
        let (rows, columns) = sample();
        let mut filters = ColumnFilters::new();
        filters.set("buyer", FilterValue::Text("north".to_string()));
        assert!(filters.row_visible(&rows[0], &columns, ""));
        assert!(!filters.row_visible(&rows[1], &columns, ""));

        filters.set("status", FilterValue::Text("shipped".to_string()));
        assert!(!filters.row_visible(&rows[0], &columns, ""));
    }

    #[test]
    fn test_global_search_matches_any_cell() {
        let (rows, columns) = sample();
        let filters = ColumnFilters::new();
        assert!(filters.row_visible(&rows[1], &columns, "coast"));
        assert!(!filters.row_visible(&rows[0], &columns, "coast"));
    }
}
