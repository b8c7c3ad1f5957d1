//! JSON payloads
//!
//! Accepted layouts:
//! - records: `[{"a": 1, "b": "x"}, ...]`
//! - values: `[[1, "x"], ...]` (columns named by position)
//! - columns: `{"a": [1, 2], ...}` or `{"a": {"0": 1, "1": 2}, ...}`

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Cell, TableError, TabularPayload};

pub(super) fn parse(bytes: &[u8]) -> Result<TabularPayload, TableError> {
    let value: Value = serde_json::from_slice(bytes)?;

    match value {
        Value::Array(items) => from_array(items),
        Value::Object(map) => from_object(map),
        other => Err(TableError::Shape(format!(
            "top-level JSON must be an array or an object, got {}",
            kind_name(&other)
        ))),
    }
}

fn from_array(items: Vec<Value>) -> Result<TabularPayload, TableError> {
    if items.is_empty() {
        return Ok(TabularPayload::default());
    }

    if items.iter().all(Value::is_object) {
        return from_records(items);
    }

    if items.iter().all(Value::is_array) {
        return from_values(items);
    }

    Err(TableError::Shape("array rows must be all objects or all arrays".to_string()))
}

fn from_records(items: Vec<Value>) -> Result<TabularPayload, TableError> {
    let mut headers: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in items.iter().filter_map(Value::as_object) {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|record| {
            headers
                .iter()
                .map(|key| record.get(key).map(cell_from_json).unwrap_or(Cell::Missing))
                .collect()
        })
        .collect();

    TabularPayload::from_rows(headers, rows)
}

fn from_values(items: Vec<Value>) -> Result<TabularPayload, TableError> {
    let width = items
        .iter()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let headers = (0..width).map(|i| i.to_string()).collect();
    let rows = items
        .iter()
        .filter_map(Value::as_array)
        .map(|row| row.iter().map(cell_from_json).collect())
        .collect();

    TabularPayload::from_rows(headers, rows)
}

fn from_object(map: Map<String, Value>) -> Result<TabularPayload, TableError> {
    if map.values().all(Value::is_array) {
        let columns = map
            .into_iter()
            .map(|(name, values)| {
                let cells = match values {
                    Value::Array(values) => values.iter().map(cell_from_json).collect(),
                    _ => Vec::new(),
                };
                (name, cells)
            })
            .collect();
        return TabularPayload::from_columns(columns);
    }

    if map.values().all(Value::is_object) {
        // Align rows by index key, first-seen order across all columns
        let mut index: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for column in map.values().filter_map(Value::as_object) {
            for key in column.keys() {
                if seen.insert(key.as_str()) {
                    index.push(key.as_str());
                }
            }
        }

        let columns = map
            .iter()
            .map(|(name, values)| {
                let cells = index
                    .iter()
                    .map(|key| {
                        values
                            .get(*key)
                            .map(cell_from_json)
                            .unwrap_or(Cell::Missing)
                    })
                    .collect();
                (name.clone(), cells)
            })
            .collect();
        return TabularPayload::from_columns(columns);
    }

    Err(TableError::Shape(
        "object columns must be all arrays or all index-keyed objects".to_string(),
    ))
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Missing,
        Value::Bool(flag) => Cell::Bool(*flag),
        Value::Number(number) => number.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
        Value::String(text) => Cell::text(text),
        nested => Cell::Text(nested.to_string()),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
