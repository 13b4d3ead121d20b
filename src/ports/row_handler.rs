use thiserror::Error;

use crate::domain::sheets::sheet_row::SheetRow;

#[derive(Error, Debug)]
pub enum RowHandlerError {
    #[error("Row handling failed: {details}")]
    HandlingFailed { details: String },
}

impl RowHandlerError {
    pub fn handling_failed<S: Into<String>>(details: S) -> Self {
        RowHandlerError::HandlingFailed {
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Appended,
    AlreadyPresent,
}

/// Receives every row accepted by the update listener.
#[async_trait::async_trait]
pub trait RowHandler: Send + Sync {
    async fn handle_row(&self, row: SheetRow) -> error_stack::Result<RowOutcome, RowHandlerError>;
}
