use super::{Cell, ColumnKind, FileType, TableError, TabularPayload};

fn csv(content: &str) -> TabularPayload {
    TabularPayload::parse(content.as_bytes(), FileType::Csv).unwrap()
}

fn json(content: &str) -> TabularPayload {
    TabularPayload::parse(content.as_bytes(), FileType::Json).unwrap()
}

fn xlsx(content: &[u8]) -> TabularPayload {
    TabularPayload::parse(content, FileType::Xlsx).unwrap()
}

const TABLE_XLSX: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/table.xlsx"));
const TYPES_XLSX: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/types.xlsx"));
const EMPTY_XLSX: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/empty.xlsx"));

fn names(table: &TabularPayload) -> Vec<&str> {
    table.columns().iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_content_type_mapping() {
    assert_eq!(FileType::from_content_type("text/csv"), Some(FileType::Csv));
    assert_eq!(FileType::from_content_type("text/csv; charset=utf-8"), Some(FileType::Csv));
    assert_eq!(FileType::from_content_type("application/json"), Some(FileType::Json));
    assert_eq!(
        FileType::from_content_type(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ),
        Some(FileType::Xlsx)
    );
    assert_eq!(FileType::from_content_type("text/plain"), None);
    assert_eq!(FileType::Xlsx.as_str(), "xlsx");
}

#[test]
fn test_raw_cell_inference() {
    assert_eq!(Cell::from_raw("42"), Cell::Number(42.0));
    assert_eq!(Cell::from_raw(" -1.5e3 "), Cell::Number(-1500.0));
    assert_eq!(Cell::from_raw(""), Cell::Missing);
    assert_eq!(Cell::from_raw("NA"), Cell::Missing);
    assert_eq!(Cell::from_raw("null"), Cell::Missing);
    assert_eq!(Cell::from_raw("True"), Cell::Bool(true));
    assert_eq!(Cell::from_raw("false"), Cell::Bool(false));
    assert_eq!(Cell::from_raw("hello"), Cell::Text("hello".to_string()));

    // Strings typed as text never become numbers
    assert_eq!(Cell::text("42"), Cell::Text("42".to_string()));
    assert_eq!(Cell::text("N/A"), Cell::Missing);
}

#[test]
fn test_csv_basic_table() {
    let table = csv("age,name\n31,alice\n45,bob\n,carol\n");

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 2);
    assert_eq!(names(&table), vec!["age", "name"]);

    let age = &table.columns()[0];
    assert_eq!(age.kind(), ColumnKind::Numeric);
    assert_eq!(age.numeric_values(), vec![31.0, 45.0]);

    let name = &table.columns()[1];
    assert_eq!(name.kind(), ColumnKind::Categorical);
    assert_eq!(name.distinct_count(), 3);
}

#[test]
fn test_csv_header_only() {
    let table = csv("a,b\n");
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.column_count(), 2);
    assert!(table.columns().iter().all(|c| c.kind() == ColumnKind::Numeric));
}

#[test]
fn test_csv_short_rows_are_padded() {
    let table = csv("a,b,c\n1,2\n");
    assert_eq!(table.columns()[2].cells, vec![Cell::Missing]);
}

#[test]
fn test_csv_long_row_is_rejected() {
    let result = TabularPayload::parse(b"a,b\n1,2,3\n", FileType::Csv);
    assert!(matches!(result, Err(TableError::Shape(_))));
}

#[test]
fn test_csv_empty_payload_is_rejected() {
    assert!(TabularPayload::parse(b"", FileType::Csv).is_err());
}

#[test]
fn test_csv_invalid_utf8_is_rejected() {
    let result = TabularPayload::parse(&[0x61, 0x0a, 0xff, 0xfe], FileType::Csv);
    assert!(matches!(result, Err(TableError::Encoding)));
}

#[test]
fn test_duplicate_and_blank_headers() {
    let table = csv("a,a,,a\n1,2,3,4\n");
    assert_eq!(names(&table), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
}

#[test]
fn test_boolean_column_is_numeric() {
    let table = csv("flag\nTrue\nFalse\nTrue\n");
    let flag = &table.columns()[0];
    assert_eq!(flag.kind(), ColumnKind::Numeric);
    assert_eq!(flag.numeric_values(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn test_json_records() {
    let table = json(r#"[{"x": 1, "y": "a"}, {"x": 2, "z": true}, {"y": null}]"#);

    assert_eq!(table.row_count(), 3);
    assert_eq!(names(&table), vec!["x", "y", "z"]);
    assert_eq!(table.columns()[0].cells, vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Missing]);
    assert_eq!(table.columns()[1].cells[2], Cell::Missing);
    assert_eq!(table.columns()[2].cells[1], Cell::Bool(true));
}

#[test]
fn test_json_values() {
    let table = json("[[1, \"a\"], [2]]");
    assert_eq!(names(&table), vec!["0", "1"]);
    assert_eq!(table.columns()[1].cells, vec![Cell::Text("a".to_string()), Cell::Missing]);
}

#[test]
fn test_json_columns_as_arrays() {
    let table = json(r#"{"b": [3, 4, 5], "a": ["p", "q", "r"]}"#);
    assert_eq!(table.row_count(), 3);
    assert_eq!(names(&table), vec!["b", "a"]);
}

#[test]
fn test_json_columns_as_index_maps() {
    let table = json(r#"{"v": {"0": 10, "1": 20}, "w": {"1": "x", "2": "y"}}"#);
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.columns()[0].cells[2], Cell::Missing);
    assert_eq!(table.columns()[1].cells[0], Cell::Missing);
}

#[test]
fn test_json_nested_values_become_text() {
    let table = json(r#"[{"tags": ["a", "b"]}]"#);
    assert_eq!(table.columns()[0].cells[0], Cell::Text("[\"a\",\"b\"]".to_string()));
}

#[test]
fn test_json_wide_records_keep_key_order() {
    let first: Vec<String> = (0..2_000).map(|i| format!("\"k{}\": {}", i, i)).collect();
    let second: Vec<String> = (0..2_000).rev().map(|i| format!("\"k{}\": {}", i, i)).collect();
    let payload = format!("[{{{}}}, {{{}, \"extra\": 1}}]", first.join(","), second.join(","));

    let table = json(&payload);
    assert_eq!(table.column_count(), 2_001);
    assert_eq!(table.columns()[0].name, "k0");
    assert_eq!(table.columns()[1_999].name, "k1999");
    assert_eq!(table.columns()[2_000].name, "extra");
    assert_eq!(table.columns()[2_000].cells, vec![Cell::Missing, Cell::Number(1.0)]);
}

#[test]
fn test_json_empty_array() {
    let table = json("[]");
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.column_count(), 0);
}

#[test]
fn test_json_rejects_bad_shapes() {
    for payload in ["42", "\"text\"", "[1, 2]", "[{\"a\": 1}, [1]]", r#"{"a": [1, 2], "b": [1]}"#] {
        let result = TabularPayload::parse(payload.as_bytes(), FileType::Json);
        assert!(matches!(result, Err(TableError::Shape(_))), "payload {} should be rejected", payload);
    }
}

#[test]
fn test_json_malformed() {
    let result = TabularPayload::parse(b"{\"a\": [1, 2", FileType::Json);
    assert!(matches!(result, Err(TableError::Json(_))));
}

#[test]
fn test_xlsx_garbage_is_rejected() {
    let result = TabularPayload::parse(b"definitely not a zip archive", FileType::Xlsx);
    assert!(matches!(result, Err(TableError::Workbook(_))));
}

#[test]
fn test_xlsx_header_and_cell_types() {
    let table = xlsx(TYPES_XLSX);

    assert_eq!(table.row_count(), 2);
    assert_eq!(names(&table), vec!["int", "float", "flag", "label", "blank", "when"]);

    let cells = |index: usize| &table.columns()[index].cells;
    assert_eq!(cells(0), &vec![Cell::Number(1.0), Cell::Number(2.0)]);
    // Error cells (#DIV/0!) read as missing
    assert_eq!(cells(1), &vec![Cell::Number(2.5), Cell::Missing]);
    assert_eq!(cells(2), &vec![Cell::Bool(true), Cell::Bool(false)]);
    // Blank shared strings read as missing
    assert_eq!(cells(3), &vec![Cell::Text("alpha".to_string()), Cell::Missing]);
    assert_eq!(cells(4), &vec![Cell::Missing, Cell::Missing]);
    assert_eq!(
        cells(5),
        &vec![
            Cell::Text("2023-03-15 00:00:00".to_string()),
            Cell::Text("2023-03-16 00:00:00".to_string()),
        ]
    );

    assert_eq!(table.columns()[2].kind(), ColumnKind::Numeric);
    assert_eq!(table.columns()[4].kind(), ColumnKind::Numeric);
    assert_eq!(table.columns()[5].kind(), ColumnKind::Categorical);
}

#[test]
fn test_xlsx_empty_worksheet_is_rejected() {
    let result = TabularPayload::parse(EMPTY_XLSX, FileType::Xlsx);
    match result {
        Err(TableError::Shape(message)) => assert_eq!(message, "worksheet is empty"),
        other => panic!("expected empty worksheet error, got {:?}", other),
    }
}

#[test]
fn test_same_table_across_formats() {
    let from_csv = csv("a,b\n1,x\n2,y\n");
    let from_json = json(r#"[{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]"#);
    let from_xlsx = xlsx(TABLE_XLSX);

    assert_eq!(from_csv.row_count(), from_json.row_count());
    assert_eq!(from_csv.column_count(), from_json.column_count());
    assert_eq!(from_csv, from_json);
    assert_eq!(from_csv, from_xlsx);
}

#[test]
fn test_distinct_count_ignores_missing_and_signed_zero() {
    let table = json(r#"[{"v": 0}, {"v": -0.0}, {"v": "foo"}, {"v": null}, {"v": "foo"}]"#);
    let column = &table.columns()[0];
    assert_eq!(column.kind(), ColumnKind::Categorical);
    assert_eq!(column.distinct_count(), 2);
}

#[test]
fn test_csv_text_column_keeps_raw_spelling() {
    let table = csv("v,n\n1,1\n1.0,1.0\nx,2\n,\n");

    let v = &table.columns()[0];
    assert_eq!(v.kind(), ColumnKind::Categorical);
    assert_eq!(
        v.cells,
        vec![
            Cell::Text("1".to_string()),
            Cell::Text("1.0".to_string()),
            Cell::Text("x".to_string()),
            Cell::Missing,
        ]
    );
    assert_eq!(v.distinct_count(), 3);

    // Fully numeric columns still compare by value
    let n = &table.columns()[1];
    assert_eq!(n.kind(), ColumnKind::Numeric);
    assert_eq!(n.distinct_count(), 2);
}
