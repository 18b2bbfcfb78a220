use std::path::{Path, PathBuf};

use serde_json::json;
use trakui::rows::Row;

/// A small order dataset shaped like the production API's records.
#[allow(dead_code)]
pub fn order_rows() -> Vec<Row> {
    serde_json::from_value(json!([
        {
            "order_no": "HF-1042",
            "buyer": "Northwear",
            "status": "Pending",
            "order_qty": 1200,
            "mainimagepath": "https://img.example.com/orders/1042.jpg"
        },
        {
            "order_no": "HF-1043",
            "buyer": "Coastline",
            "status": "Shipped",
            "order_qty": 800,
            "mainimagepath": "https://img.example.com/orders/1043.jpg"
        },
        {
            "order_no": "HF-1044",
            "buyer": "Redwood Apparel",
            "status": "In Progress",
            "order_qty": 450,
            "mainimagepath": null
        }
    ]))
    .unwrap()
}

/// Write rows to a JSON fixture file and return its path.
#[allow(dead_code)]
pub fn write_fixture(dir: &Path, name: &str, rows: &[Row]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(rows).unwrap()).unwrap();
    path
}
