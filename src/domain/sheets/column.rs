use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

/// 1-based spreadsheet column (`A` is 1, `Z` is 26, `AA` is 27).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Column(u32);

impl Column {
    pub fn new(value: u32) -> Option<Self> {
        (value != 0).then_some(Column(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Number of columns between `self` and `end`, both included.
    ///
    /// # Examples
    /// ```
    /// use sheet_sync::domain::sheets::column::Column;
    /// let a: Column = "A".parse().unwrap();
    /// let h: Column = "H".parse().unwrap();
    /// assert_eq!(a.span_to(h), 8);
    /// assert_eq!(h.span_to(a), 8);
    /// ```
    pub fn span_to(&self, end: Column) -> u32 {
        self.0.abs_diff(end.0) + 1
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Show both the numeric and letter representation
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnParseError {
    #[error("Empty column")]
    Empty,
    #[error("Non-alphabetic character in column")]
    NonAlphabeticCharacter,
    #[error("Column out of range")]
    Overflow,
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_col(s)
    }
}

impl From<Column> for u32 {
    fn from(col: Column) -> Self {
        col.0
    }
}

pub fn parse_col<T: AsRef<str>>(col_str: T) -> Result<Column, ColumnParseError> {
    let col_str = col_str.as_ref();
    if col_str.is_empty() {
        return Err(ColumnParseError::Empty);
    }
    if col_str.chars().any(|c| !c.is_ascii_alphabetic()) {
        return Err(ColumnParseError::NonAlphabeticCharacter);
    }

    col_str
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)
                .and_then(|acc| acc.checked_add(c as u32 - 'A' as u32 + 1))
        })
        .map(Column)
        .ok_or(ColumnParseError::Overflow)
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        let letter = (remainder as u8 + b'A') as char;
        result.push(letter);
        number = (number - remainder) / 26;
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_display_a() {
        assert_eq!(Column(1).to_string(), "A");
    }

    #[test]
    fn test_column_display_z() {
        assert_eq!(Column(26).to_string(), "Z");
    }

    #[test]
    fn test_column_display_aa() {
        assert_eq!(Column(27).to_string(), "AA");
    }

    #[test]
    fn test_parse_col_lowercase() {
        assert_eq!(parse_col("h"), Ok(Column(8)));
    }

    #[test]
    fn test_parse_col_two_letters() {
        assert_eq!(parse_col("AB"), Ok(Column(28)));
    }

    #[test]
    fn test_parse_col_rejects_digits() {
        assert_eq!(parse_col("A1"), Err(ColumnParseError::NonAlphabeticCharacter));
    }

    #[test]
    fn test_parse_col_rejects_empty() {
        assert_eq!(parse_col(""), Err(ColumnParseError::Empty));
    }

    #[test]
    fn test_zero_column_is_rejected() {
        assert_eq!(Column::new(0), None);
        assert_eq!(Column::new(3), Some(Column(3)));
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Column(8)), "Column(u32: 8, letters: H)");
    }
}
