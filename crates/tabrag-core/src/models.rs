//! Core data types for the row-level embedding store.
//!
//! These structs serialize directly to the on-disk collection format:
//!
//! ```json
//! {
//!   "source_file": "cities.csv",
//!   "total_rows": 2,
//!   "rows": [
//!     { "row_data": {"id": 1, "city": "Paris"},
//!       "row_text": "id: 1, city: Paris",
//!       "cleaned_text": "id 1 city paris",
//!       "embedding": [0.12, -0.4] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One parsed source row: column name to scalar value, in source column order.
pub type RowData = serde_json::Map<String, Value>;

/// A single ingested row with its text forms and embedding.
///
/// An empty `embedding` marks a row whose embedding failed during ingestion.
/// Such rows are persisted for traceability but never ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub row_data: RowData,
    pub row_text: String,
    pub cleaned_text: String,
    /// Stored as `f32`; wider values in a collection file are rounded on read.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl RowRecord {
    /// Whether this row takes part in similarity ranking.
    pub fn is_scorable(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// All rows derived from one ingested source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Original file name. Display identity only; not unique across collections.
    pub source_file: String,
    pub total_rows: usize,
    pub rows: Vec<RowRecord>,
}

impl Collection {
    /// Build a collection whose `total_rows` matches the rows written.
    pub fn new(source_file: impl Into<String>, rows: Vec<RowRecord>) -> Self {
        Self {
            source_file: source_file.into(),
            total_rows: rows.len(),
            rows,
        }
    }

    pub fn scorable_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_scorable()).count()
    }
}

/// A ranked row returned by [`top_k`](crate::search::top_k).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub row_data: RowData,
    pub score: f64,
    pub source_file: String,
}

/// Render a row as `"col: value, col: value"`.
///
/// Strings are written without quotes; numbers, booleans and null use their
/// JSON spelling.
pub fn render_row(row: &RowData) -> String {
    row.iter()
        .map(|(k, v)| format!("{}: {}", k, render_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RowData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_row_keeps_column_order() {
        let r = row(json!({"name": "Ada", "age": 36, "email": null, "active": true}));
        assert_eq!(
            render_row(&r),
            "name: Ada, age: 36, email: null, active: true"
        );
    }

    #[test]
    fn test_render_empty_row() {
        assert_eq!(render_row(&RowData::new()), "");
    }

    #[test]
    fn test_collection_counts() {
        let rows = vec![
            RowRecord {
                row_data: row(json!({"id": 1})),
                row_text: "id: 1".into(),
                cleaned_text: "id 1".into(),
                embedding: vec![1.0, 0.0],
            },
            RowRecord {
                row_data: row(json!({"id": 2})),
                row_text: "id: 2".into(),
                cleaned_text: "id 2".into(),
                embedding: Vec::new(),
            },
        ];
        let c = Collection::new("ids.csv", rows);
        assert_eq!(c.total_rows, 2);
        assert_eq!(c.scorable_rows(), 1);
    }

    #[test]
    fn test_embedding_read_as_f32() {
        let r: RowRecord = serde_json::from_value(json!({
            "row_data": {"id": 1},
            "row_text": "id: 1",
            "cleaned_text": "id 1",
            "embedding": [0.123456789012345, 1.0]
        }))
        .unwrap();
        assert_eq!(r.embedding, vec![0.123456789012345f64 as f32, 1.0]);
        assert_eq!(serde_json::to_value(&r).unwrap()["embedding"][1], 1.0);
    }

    #[test]
    fn test_missing_embedding_field_defaults_to_empty() {
        let r: RowRecord = serde_json::from_value(json!({
            "row_data": {"id": 1},
            "row_text": "id: 1",
            "cleaned_text": "id 1"
        }))
        .unwrap();
        assert!(!r.is_scorable());
    }
}
