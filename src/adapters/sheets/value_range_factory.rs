use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::sheets::sheet_row::SheetRow;

pub trait ValueRangeFactory {
    fn from_row(row: &SheetRow) -> Self;
}

fn wrap_value(value: &str) -> Value {
    Value::String(value.to_owned())
}

fn unwrap_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl ValueRangeFactory for ValueRange {
    fn from_row(row: &SheetRow) -> Self {
        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![row.cells().iter().map(|c| wrap_value(c)).collect()]),
        }
    }
}

/// Converts the raw API grid into rows. A `ValueRange` without values is an
/// empty range.
pub trait IntoSheetRows {
    fn into_sheet_rows(self) -> Vec<SheetRow>;
}

impl IntoSheetRows for ValueRange {
    fn into_sheet_rows(self) -> Vec<SheetRow> {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(unwrap_value).collect::<SheetRow>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_value() {
        assert_eq!(wrap_value("1"), Value::String("1".to_string()));
    }

    #[test]
    fn test_from_row() {
        let value_range = ValueRange::from_row(&SheetRow::from(["2024-01-01", "10"]));
        assert_eq!(
            value_range.major_dimension,
            Some("ROWS".to_string()),
            "Major dimension should be ROWS"
        );
        assert_eq!(value_range.range, None, "Range should be None");
        assert_eq!(
            value_range.values,
            Some(vec![vec![
                Value::String("2024-01-01".to_string()),
                Value::String("10".to_string())
            ]]),
            "Values should be a single row"
        );
    }

    #[test]
    fn test_into_sheet_rows_without_values() {
        let value_range = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: Some("Sheet1!A3:H1000".to_string()),
            values: None,
        };
        assert!(value_range.into_sheet_rows().is_empty());
    }

    #[test]
    fn test_into_sheet_rows_keeps_ragged_rows() {
        let value_range = ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![
                vec![Value::String("a".to_string()), serde_json::json!(10)],
                vec![Value::String("b".to_string())],
                vec![Value::Null, Value::Bool(true)],
            ]),
        };
        assert_eq!(
            value_range.into_sheet_rows(),
            vec![
                SheetRow::from(["a", "10"]),
                SheetRow::from(["b"]),
                SheetRow::from(["", "true"]),
            ]
        );
    }
}
