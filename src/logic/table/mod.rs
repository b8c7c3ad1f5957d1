//! Tabular Payload - in-memory table parsed from an uploaded file
//!
//! One parser per declared upload type. All of them produce the same
//! row/column shape so feature extraction never sees the wire format.

mod delimited;
mod records;
mod workbook;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

// ============================================================================
// FILE TYPE
// ============================================================================

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Declared type of an uploaded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Json,
    Xlsx,
}

impl FileType {
    /// Map an upload's declared content type to a parser branch.
    /// Media type parameters (`; charset=utf-8`) are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            CSV_CONTENT_TYPE => Some(FileType::Csv),
            JSON_CONTENT_TYPE => Some(FileType::Json),
            XLSX_CONTENT_TYPE => Some(FileType::Xlsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Json => "json",
            FileType::Xlsx => "xlsx",
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("payload is not valid UTF-8")]
    Encoding,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xlsx error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("unsupported table shape: {0}")]
    Shape(String),
}

// ============================================================================
// CELLS
// ============================================================================

/// Tokens read as a missing value in textual payloads
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL",
    "None", "#N/A", "<NA>",
];

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Interpret a raw textual field (CSV)
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if NA_TOKENS.contains(&raw) {
            return Cell::Missing;
        }

        match raw {
            "True" | "true" | "TRUE" => return Cell::Bool(true),
            "False" | "false" | "FALSE" => return Cell::Bool(false),
            _ => {}
        }

        match raw.parse::<f64>() {
            Ok(value) => Cell::Number(value),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    /// Text that is already typed as a string: only NA detection applies
    pub fn text(raw: &str) -> Self {
        let raw = raw.trim();
        if NA_TOKENS.contains(&raw) {
            Cell::Missing
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view of the cell. Booleans count as 1.0 / 0.0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// Hash key used for distinct-value counting
#[derive(PartialEq, Eq)]
enum DistinctKey<'a> {
    Number(u64),
    Bool(bool),
    Text(&'a str),
}

impl Hash for DistinctKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DistinctKey::Number(bits) => (0u8, bits).hash(state),
            DistinctKey::Bool(flag) => (1u8, flag).hash(state),
            DistinctKey::Text(text) => (2u8, text).hash(state),
        }
    }
}

impl<'a> DistinctKey<'a> {
    fn of(cell: &'a Cell) -> Option<Self> {
        match cell {
            Cell::Missing => None,
            // +0.0 and -0.0 are the same value
            Cell::Number(value) if *value == 0.0 => Some(DistinctKey::Number(0f64.to_bits())),
            Cell::Number(value) => Some(DistinctKey::Number(value.to_bits())),
            Cell::Bool(flag) => Some(DistinctKey::Bool(*flag)),
            Cell::Text(text) => Some(DistinctKey::Text(text)),
        }
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

/// Column type, decided once before any statistic is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Numeric iff every non-missing cell has a numeric view.
    /// A column with no values at all is numeric.
    pub fn kind(&self) -> ColumnKind {
        let all_numeric = self
            .cells
            .iter()
            .filter(|c| !c.is_missing())
            .all(|c| c.as_number().is_some());

        if all_numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    /// Non-missing numeric values in row order
    pub fn numeric_values(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_number).collect()
    }

    /// Count of distinct non-missing values
    pub fn distinct_count(&self) -> usize {
        self.cells
            .iter()
            .filter_map(DistinctKey::of)
            .collect::<HashSet<_>>()
            .len()
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Parsed table: N rows, M named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularPayload {
    columns: Vec<Column>,
    row_count: usize,
}

impl TabularPayload {
    /// Parse raw bytes according to the declared type
    pub fn parse(bytes: &[u8], file_type: FileType) -> Result<Self, TableError> {
        match file_type {
            FileType::Csv => delimited::parse(bytes),
            FileType::Json => records::parse(bytes),
            FileType::Xlsx => workbook::parse(bytes),
        }
    }

    /// Build from a header and row-major cells.
    /// Short rows are padded with missing cells; long rows are rejected.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let names = dedupe_headers(headers);
        let width = names.len();
        let row_count = rows.len();

        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column { name, cells: Vec::with_capacity(row_count) })
            .collect();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(TableError::Shape(format!(
                    "row {} has {} fields, header has {}",
                    index + 1,
                    row.len(),
                    width
                )));
            }

            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(cells.next().unwrap_or(Cell::Missing));
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Build from named columns that must all have the same length
    pub fn from_columns(columns: Vec<(String, Vec<Cell>)>) -> Result<Self, TableError> {
        let row_count = columns.first().map(|(_, cells)| cells.len()).unwrap_or(0);

        if let Some((name, cells)) = columns.iter().find(|(_, cells)| cells.len() != row_count) {
            return Err(TableError::Shape(format!(
                "column '{}' has {} values, expected {}",
                name,
                cells.len(),
                row_count
            )));
        }

        let (names, cells): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        let columns = dedupe_headers(names)
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column { name, cells })
            .collect();

        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// Name blank headers by position and suffix repeated names
/// (`a`, `a` -> `a`, `a.1`).
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut repeats: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (position, header) in headers.into_iter().enumerate() {
        let base = match header.trim() {
            "" => format!("Unnamed: {}", position),
            trimmed => trimmed.to_string(),
        };

        let mut name = base.clone();
        while taken.contains(&name) {
            let counter = repeats.entry(base.clone()).or_insert(0);
            *counter += 1;
            name = format!("{}.{}", base, counter);
        }

        taken.insert(name.clone());
        names.push(name);
    }

    names
}
