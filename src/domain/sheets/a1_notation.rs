use std::{fmt::Formatter, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::column::{parse_col, Column, ColumnParseError};

static A1_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<sheet>'(?:[^']|'')+'|[^'!]+)!)?(?P<start_col>[A-Za-z]+)(?P<start_row>\d+)?(?::(?P<end_col>[A-Za-z]+)(?P<end_row>\d+)?)?$",
    )
    .expect("A1 range pattern is valid")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum A1NotationParseError {
    #[error("'{0}' is not a valid A1 range")]
    InvalidRange(String),
    #[error("Error parsing column: {0}")]
    ColumnParseError(#[from] ColumnParseError),
    #[error("Error parsing row in '{0}'")]
    RowParseError(String),
}

/// A validated A1 range such as `Sheet1!A3:H` or `'My Sheet'!B2:D10`.
///
/// The original text is kept verbatim and is what gets sent to the Sheets API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct A1Notation {
    raw: String,
    sheet_title: Option<String>,
    start_col: Column,
    start_row: Option<u32>,
    end_col: Option<Column>,
    end_row: Option<u32>,
}

impl A1Notation {
    pub fn sheet_title(&self) -> Option<&str> {
        self.sheet_title.as_deref()
    }

    pub fn start_col(&self) -> Column {
        self.start_col
    }

    pub fn start_row(&self) -> Option<u32> {
        self.start_row
    }

    pub fn end_col(&self) -> Column {
        self.end_col.unwrap_or(self.start_col)
    }

    pub fn end_row(&self) -> Option<u32> {
        self.end_row
    }

    /// Amount of columns covered by the range.
    ///
    /// # Examples
    /// ```
    /// use sheet_sync::domain::sheets::a1_notation::A1Notation;
    /// let range: A1Notation = "Sheet1!A3:H".parse().unwrap();
    /// assert_eq!(range.column_span(), 8);
    /// assert_eq!(range.sheet_title(), Some("Sheet1"));
    /// ```
    pub fn column_span(&self) -> u32 {
        self.start_col.span_to(self.end_col())
    }
}

fn parse_row(raw: &str, row: Option<&str>) -> Result<Option<u32>, A1NotationParseError> {
    row.map(|row| {
        row.parse::<u32>()
            .ok()
            .filter(|row| *row != 0)
            .ok_or_else(|| A1NotationParseError::RowParseError(raw.to_owned()))
    })
    .transpose()
}

fn unquote_sheet_title(title: &str) -> String {
    match title.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        Some(quoted) => quoted.replace("''", "'"),
        None => title.to_owned(),
    }
}

impl FromStr for A1Notation {
    type Err = A1NotationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let captures = A1_RANGE
            .captures(trimmed)
            .ok_or_else(|| A1NotationParseError::InvalidRange(s.to_owned()))?;

        let start_col = parse_col(&captures["start_col"])?;
        let end_col = captures
            .name("end_col")
            .map(|m| parse_col(m.as_str()))
            .transpose()?;

        Ok(A1Notation {
            raw: trimmed.to_owned(),
            sheet_title: captures
                .name("sheet")
                .map(|m| unquote_sheet_title(m.as_str())),
            start_col,
            start_row: parse_row(trimmed, captures.name("start_row").map(|m| m.as_str()))?,
            end_col,
            end_row: parse_row(trimmed, captures.name("end_row").map(|m| m.as_str()))?,
        })
    }
}

impl TryFrom<String> for A1Notation {
    type Error = A1NotationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
