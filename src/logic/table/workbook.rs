//! XLSX payloads: first worksheet, first row is the header

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use super::{Cell, TableError, TabularPayload};

pub(super) fn parse(bytes: &[u8]) -> Result<TabularPayload, TableError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::Shape("workbook has no worksheets".to_string()))??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(header_name).collect(),
        None => return Err(TableError::Shape("worksheet is empty".to_string())),
    };

    let rows = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    TabularPayload::from_rows(headers, rows)
}

fn header_name(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(name) => name.trim().to_string(),
        other => other.to_string(),
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::Bool(flag) => Cell::Bool(*flag),
        Data::String(text) => Cell::text(text),
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::DateTime(stamp) if stamp.is_datetime() => stamp
            .as_datetime()
            .map(|moment| Cell::Text(moment.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(Cell::Missing),
        // Durations and ISO strings are kept as their display form
        other => Cell::Text(other.to_string()),
    }
}
