use error_stack::ResultExt;
use sheet_sync::{
    adapters::{
        config::sheets_config::{SheetBackend, SpreadsheetConfig},
        sheets::{memory_store::InMemorySheetStore, spreadsheet_manager::SpreadsheetManager},
    },
    application::sync::sheet_synchronizer::{SheetSynchronizer, SyncError},
    ports::sheet_store::SheetStore,
};
use std::sync::Arc;
use tracing::warn;

pub struct SynchronizerFactory;

impl SynchronizerFactory {
    pub async fn create(
        config: &SpreadsheetConfig,
    ) -> error_stack::Result<Arc<SheetSynchronizer>, SyncError> {
        let store = Self::create_store(config).await?;
        let synchronizer = SheetSynchronizer::init(store, config.range.clone()).await?;
        Ok(Arc::new(synchronizer))
    }

    async fn create_store(
        config: &SpreadsheetConfig,
    ) -> error_stack::Result<Arc<dyn SheetStore>, SyncError> {
        match config.backend {
            SheetBackend::Google => {
                let manager = SpreadsheetManager::new(config.clone())
                    .await
                    .change_context(SyncError::InitFailed)?;
                Ok(Arc::new(manager))
            }
            SheetBackend::Memory => {
                warn!("Using the in-memory sheet backend, rows will not reach Google Sheets");
                Ok(Arc::new(InMemorySheetStore::new()))
            }
        }
    }
}
