//! Row records and dataset snapshots.

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

/// One record of a dataset, keyed by column identifier. Key order is
/// preserved from the source document; the first row's order becomes the
/// column order.
pub type Row = Map<String, Value>;

/// Display text for one cell. Null and missing values render as the empty
/// string, never as the literal word "null".
pub fn cell_text(row: &Row, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A dataset snapshot. A refresh replaces the whole snapshot; rows are never
/// merged or diffed, so whichever load finishes last wins.
#[derive(Debug, Clone)]
pub struct RowSet {
    rows: Vec<Row>,
    fetched_at: DateTime<Local>,
}

impl RowSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            fetched_at: Local::now(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }
}
