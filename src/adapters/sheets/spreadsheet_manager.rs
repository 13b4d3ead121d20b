use std::fmt::Debug;

use error_stack::ResultExt;
use google_sheets4::{
    api::{Scope, ValueRange},
    Sheets,
};
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    adapters::config::sheets_config::SpreadsheetConfig,
    domain::sheets::{a1_notation::A1Notation, sheet_row::SheetRow},
    ports::sheet_store::{SheetStore, SheetStoreError},
};

use super::{
    auth,
    http_client::{self, HttpsConnector},
    value_range_factory::{IntoSheetRows, ValueRangeFactory},
};

pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    hub: Sheets<HttpsConnector>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

#[derive(Error, Debug)]
pub enum SpreadsheetManagerError {
    #[error("Failed to build HTTP client")]
    FailedToBuildClient,
    #[error("Failed to read credentials")]
    FailedToReadCredentials,
    #[error("Failed to authenticate")]
    FailedToAuthenticate,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to append to range")]
    FailedToAppendRange,
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new", skip(config), fields(spreadsheet_id = %config.spreadsheet_id))]
    pub async fn new(
        config: SpreadsheetConfig,
    ) -> error_stack::Result<Self, SpreadsheetManagerError> {
        info!("Initialising Google Sheets service");
        let client = http_client::http_client()
            .change_context(SpreadsheetManagerError::FailedToBuildClient)
            .attach_printable("could not load platform root certificates")?;
        let auth = auth::auth(&config, client.clone()).await?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager { config, hub })
    }

    #[instrument]
    pub async fn read_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<ValueRange, SpreadsheetManagerError> {
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.config.spreadsheet_id, range.as_ref())
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchRange)
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        Ok(value_range)
    }

    #[instrument]
    pub async fn append_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_append(value_range, &self.config.spreadsheet_id, range.as_ref())
            .value_input_option("USER_ENTERED")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToAppendRange)
            .attach_printable_lazy(|| format!("Failed to append to range {} ", range))
    }
}

#[async_trait::async_trait]
impl SheetStore for SpreadsheetManager {
    async fn read_rows(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<SheetRow>, SheetStoreError> {
        self.read_range(range)
            .await
            .map(IntoSheetRows::into_sheet_rows)
            .change_context(SheetStoreError::ReadFailed)
    }

    async fn append_row(
        &self,
        range: &A1Notation,
        row: &SheetRow,
    ) -> error_stack::Result<(), SheetStoreError> {
        self.append_range(range, ValueRange::from_row(row))
            .await
            .change_context(SheetStoreError::AppendFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::config::sheets_config::{CredentialKind, SheetBackend};

    #[tokio::test]
    async fn test_new_without_credentials_returns_error() {
        let config = SpreadsheetConfig {
            spreadsheet_id: "test".into(),
            range: "Sheet1!A3:H".parse().unwrap(),
            secret_dir: std::env::temp_dir().join("sheet-sync-no-secrets-here"),
            credential_file: "credentials.json".into(),
            credential_kind: CredentialKind::ServiceAccount,
            backend: SheetBackend::Google,
        };

        let report = SpreadsheetManager::new(config).await.unwrap_err();

        // Depending on the host, either the certificate store or the key file is missing
        assert!(matches!(
            report.current_context(),
            SpreadsheetManagerError::FailedToBuildClient
                | SpreadsheetManagerError::FailedToReadCredentials
        ));
    }
}
