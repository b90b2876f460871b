//! Tabular file loading (CSV and JSON) into ordered row maps.
//!
//! | Extension | Parsing |
//! |-----------|---------|
//! | `.csv` | header row gives column names; cells are type-inferred |
//! | `.json` | array of flat objects, or one flat object |
//!
//! Any other extension is [`InputError::UnsupportedFileType`]. Column order
//! from the file is preserved in every [`RowData`].

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde_json::{Number, Value};
use tabrag_core::{InputError, RowData};

/// Load every row of a CSV or JSON file.
pub fn load_rows(path: &Path) -> Result<Vec<RowData>, InputError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_csv(file)
        }
        "json" => {
            let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_json(&content)
        }
        _ => Err(InputError::UnsupportedFileType {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", extension)
            },
        }),
    }
}

/// Whether `file_name` has an extension [`load_rows`] accepts.
pub fn is_supported(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "csv" | "json"))
        .unwrap_or(false)
}

/// Parse CSV text with a header row.
pub fn parse_csv<R: std::io::Read>(input: R) -> Result<Vec<RowData>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers = dedupe_headers(
        reader
            .headers()
            .map_err(|e| InputError::Parse(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string()),
    );

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| InputError::Malformed {
            row: idx + 1,
            reason: e.to_string(),
        })?;
        let mut row = RowData::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), infer_cell(cell));
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Rename repeated column names to `name.1`, `name.2`, ... so no cell is
/// overwritten. A generated name that is already taken is skipped.
fn dedupe_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for header in headers {
        let name = if taken.contains(&header) {
            let n = seen.entry(header.clone()).or_insert(0);
            loop {
                *n += 1;
                let candidate = format!("{}.{}", header, n);
                if !taken.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            header
        };
        taken.insert(name.clone());
        out.push(name);
    }

    out
}

/// Parse a JSON document holding flat row objects.
pub fn parse_json(content: &str) -> Result<Vec<RowData>, InputError> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| InputError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => {
            return Err(InputError::Parse(
                "expected an array of objects or a single object".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => {
                if let Some((key, _)) = map
                    .iter()
                    .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
                {
                    return Err(InputError::Malformed {
                        row: idx + 1,
                        reason: format!("column '{}' is not a scalar value", key),
                    });
                }
                Ok(map)
            }
            _ => Err(InputError::Malformed {
                row: idx + 1,
                reason: "row is not an object".to_string(),
            }),
        })
        .collect()
}

/// Empty cells become null; integers and finite floats become numbers.
fn infer_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}
