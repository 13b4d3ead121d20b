use thiserror::Error;

use crate::domain::sheets::{a1_notation::A1Notation, sheet_row::SheetRow};

#[derive(Error, Debug)]
pub enum SheetStoreError {
    #[error("Failed to read rows from the sheet")]
    ReadFailed,
    #[error("Failed to append row to the sheet")]
    AppendFailed,
}

/// Remote tabular store holding the authoritative rows of a range.
#[async_trait::async_trait]
pub trait SheetStore: Send + Sync {
    /// Returns every row currently stored in `range`, top to bottom. An empty
    /// range yields an empty vector.
    async fn read_rows(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<SheetRow>, SheetStoreError>;

    /// Appends `row` after the last row of `range`, letting the store interpret
    /// values as if they were typed by a user.
    async fn append_row(
        &self,
        range: &A1Notation,
        row: &SheetRow,
    ) -> error_stack::Result<(), SheetStoreError>;
}
