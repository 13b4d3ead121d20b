use serde::{Deserialize, Serialize};

/// Column holding the record key (usually a timestamp). It never takes part in
/// duplicate detection.
pub const KEY_COLUMN: usize = 0;

/// One record of the sheet: an ordered list of cell values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetRow(Vec<String>);

impl SheetRow {
    pub fn new(cells: Vec<String>) -> Self {
        SheetRow(cells)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` carries new data compared to the `stored` row.
    ///
    /// Every column of `self` except [`KEY_COLUMN`] is compared. Cells missing
    /// from `stored` count as empty, since the Sheets API trims trailing blank
    /// cells. Extra cells in `stored` are ignored.
    ///
    /// # Examples
    /// ```
    /// use sheet_sync::SheetRow;
    /// let stored = SheetRow::from(["2024-01-01", "10", "20"]);
    /// assert!(!SheetRow::from(["2024-01-02", "10", "20"]).differs_from(&stored));
    /// assert!(SheetRow::from(["2024-01-02", "10", "21"]).differs_from(&stored));
    /// ```
    pub fn differs_from(&self, stored: &SheetRow) -> bool {
        self.0
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != KEY_COLUMN)
            .any(|(index, value)| stored.cell(index).unwrap_or_default() != value.as_str())
    }
}

impl From<Vec<String>> for SheetRow {
    fn from(cells: Vec<String>) -> Self {
        SheetRow(cells)
    }
}

impl<const N: usize> From<[&str; N]> for SheetRow {
    fn from(cells: [&str; N]) -> Self {
        cells.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SheetRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SheetRow(iter.into_iter().map(Into::into).collect())
    }
}

impl From<SheetRow> for Vec<String> {
    fn from(row: SheetRow) -> Self {
        row.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_column_change_only_is_not_distinct() {
        let stored = SheetRow::from(["2024-01-01", "10", "20"]);
        let incoming = SheetRow::from(["2030-12-31", "10", "20"]);
        assert!(!incoming.differs_from(&stored));
    }

    #[test]
    fn test_any_other_column_change_is_distinct() {
        let stored = SheetRow::from(["k", "a", "b", "c"]);
        assert!(SheetRow::from(["k", "x", "b", "c"]).differs_from(&stored));
        assert!(SheetRow::from(["k", "a", "x", "c"]).differs_from(&stored));
        assert!(SheetRow::from(["k", "a", "b", "x"]).differs_from(&stored));
    }

    #[test]
    fn test_missing_stored_cells_compare_as_empty() {
        let stored = SheetRow::from(["k", "a"]);
        assert!(!SheetRow::from(["k", "a", ""]).differs_from(&stored));
        assert!(SheetRow::from(["k", "a", "b"]).differs_from(&stored));
    }

    #[test]
    fn test_extra_stored_cells_are_ignored() {
        let stored = SheetRow::from(["k", "a", "b", "c"]);
        assert!(!SheetRow::from(["k", "a"]).differs_from(&stored));
    }

    #[test]
    fn test_key_only_row_is_never_distinct() {
        let stored = SheetRow::from(["k", "a"]);
        assert!(!SheetRow::from(["other"]).differs_from(&stored));
    }

    #[test]
    fn test_deserialize_transparent() {
        let row: SheetRow = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(row, SheetRow::from(["a", "b"]));
        assert_eq!(row.len(), 2);
        assert_eq!(row.cell(1), Some("b"));
        assert_eq!(row.cell(2), None);
    }
}
