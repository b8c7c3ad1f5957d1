//! CSV payloads: first record is the header
//!
//! Fields are typed per column. A column where any field fails to read as
//! a number or boolean keeps every field as its raw text, so `1` and `1.0`
//! stay distinct values there.

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{Cell, TableError, TabularPayload};

pub(super) fn parse(bytes: &[u8]) -> Result<TabularPayload, TableError> {
    let content = std::str::from_utf8(bytes).map_err(|_| TableError::Encoding)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true) // ragged rows are checked against the header below
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(TableError::Shape("missing header row".to_string()));
    }

    let records = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;

    let width = records.iter().map(StringRecord::len).max().unwrap_or(0);
    let mut textual = vec![false; width];
    for record in &records {
        for (index, field) in record.iter().enumerate() {
            if !textual[index] && matches!(Cell::from_raw(field), Cell::Text(_)) {
                textual[index] = true;
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    if textual[index] {
                        Cell::text(field)
                    } else {
                        Cell::from_raw(field)
                    }
                })
                .collect()
        })
        .collect();

    TabularPayload::from_rows(headers, rows)
}
