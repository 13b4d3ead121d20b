use std::sync::Arc;

use error_stack::ResultExt;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    domain::sheets::{a1_notation::A1Notation, sheet_row::SheetRow},
    ports::{
        row_handler::{RowHandler, RowHandlerError, RowOutcome},
        sheet_store::SheetStore,
    },
};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to initialise the sheet synchronizer")]
    InitFailed,
    #[error("Failed to fetch current rows")]
    FetchFailed,
    #[error("Failed to append row")]
    AppendFailed,
}

/// Appends received rows to a sheet range unless they repeat its last row.
///
/// The authoritative state lives in the store and is fetched again for every
/// row. The read-compare-append sequence is serialized, so concurrent rows are
/// applied one after another.
pub struct SheetSynchronizer {
    store: Arc<dyn SheetStore>,
    range: A1Notation,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for SheetSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SheetSynchronizer {{ range: {} }}", self.range)
    }
}

impl SheetSynchronizer {
    /// Performs one read of `range` to confirm the store is reachable.
    #[instrument(name = "SheetSynchronizer::init", skip(store))]
    pub async fn init(
        store: Arc<dyn SheetStore>,
        range: A1Notation,
    ) -> error_stack::Result<Self, SyncError> {
        let rows = store
            .read_rows(&range)
            .await
            .change_context(SyncError::InitFailed)
            .attach_printable_lazy(|| format!("Unable to retrieve data from range {}", range))?;

        info!(rows = rows.len(), "Sheet synchronizer successfully initialized");

        Ok(SheetSynchronizer {
            store,
            range,
            write_lock: Mutex::new(()),
        })
    }

    pub fn range(&self) -> &A1Notation {
        &self.range
    }

    #[instrument(skip(self), fields(range = %self.range))]
    pub async fn update_or_insert(&self, row: SheetRow) -> error_stack::Result<RowOutcome, SyncError> {
        let _guard = self.write_lock.lock().await;

        info!("Checking if received row is already present");
        let rows = self
            .store
            .read_rows(&self.range)
            .await
            .change_context(SyncError::FetchFailed)?;

        let distinct = match rows.last() {
            Some(current) => row.differs_from(current),
            None => {
                info!("No data found in range");
                true
            }
        };

        if !distinct {
            info!("Received row already present in sheet");
            return Ok(RowOutcome::AlreadyPresent);
        }

        let span = self.range.column_span() as usize;
        if row.len() > span {
            warn!(
                cells = row.len(),
                span, "Received row is wider than the range, extra cells may be dropped"
            );
        }

        info!("Received row distinct from current data, pushing update");
        self.store
            .append_row(&self.range, &row)
            .await
            .change_context(SyncError::AppendFailed)?;
        info!("Successfully pushed update");

        Ok(RowOutcome::Appended)
    }
}

#[async_trait::async_trait]
impl RowHandler for SheetSynchronizer {
    async fn handle_row(&self, row: SheetRow) -> error_stack::Result<RowOutcome, RowHandlerError> {
        self.update_or_insert(row)
            .await
            .change_context_lazy(|| RowHandlerError::handling_failed("sheet update failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sheets::memory_store::InMemorySheetStore;

    fn range() -> A1Notation {
        "Sheet1!A3:H".parse().unwrap()
    }

    async fn synchronizer(store: &Arc<InMemorySheetStore>) -> SheetSynchronizer {
        SheetSynchronizer::init(store.clone(), range()).await.unwrap()
    }

    #[tokio::test]
    async fn test_init_reads_range_once() {
        let store = Arc::new(InMemorySheetStore::new());
        let sync = synchronizer(&store).await;
        assert_eq!(store.read_count(), 1);
        assert_eq!(sync.range().to_string(), "Sheet1!A3:H");
    }

    #[tokio::test]
    async fn test_init_fails_when_store_unreachable() {
        let store = Arc::new(InMemorySheetStore::new());
        store.set_fail_reads(true);
        let report = SheetSynchronizer::init(store, range()).await.unwrap_err();
        assert!(matches!(report.current_context(), SyncError::InitFailed));
    }

    #[tokio::test]
    async fn test_empty_range_appends() {
        let store = Arc::new(InMemorySheetStore::new());
        let sync = synchronizer(&store).await;

        let row = SheetRow::from(["2024-01-01", "10", "20"]);
        let outcome = sync.update_or_insert(row.clone()).await.unwrap();

        assert_eq!(outcome, RowOutcome::Appended);
        assert_eq!(store.rows().await, vec![row]);
    }

    #[tokio::test]
    async fn test_only_key_column_changed_is_not_appended() {
        let store = Arc::new(InMemorySheetStore::with_rows(vec![SheetRow::from([
            "2024-01-01",
            "10",
            "20",
        ])]));
        let sync = synchronizer(&store).await;

        let outcome = sync
            .update_or_insert(SheetRow::from(["2024-01-02", "10", "20"]))
            .await
            .unwrap();

        assert_eq!(outcome, RowOutcome::AlreadyPresent);
        assert_eq!(store.append_count(), 0);
    }

    #[tokio::test]
    async fn test_changed_column_is_appended_once() {
        let store = Arc::new(InMemorySheetStore::with_rows(vec![SheetRow::from([
            "2024-01-01",
            "10",
            "20",
        ])]));
        let sync = synchronizer(&store).await;

        let row = SheetRow::from(["2024-01-02", "10", "21"]);
        let outcome = sync.update_or_insert(row.clone()).await.unwrap();

        assert_eq!(outcome, RowOutcome::Appended);
        assert_eq!(store.append_count(), 1);
        assert_eq!(store.rows().await.last(), Some(&row));
    }

    #[tokio::test]
    async fn test_compares_against_last_row_only() {
        let store = Arc::new(InMemorySheetStore::with_rows(vec![
            SheetRow::from(["1", "a"]),
            SheetRow::from(["2", "b"]),
        ]));
        let sync = synchronizer(&store).await;

        // Matches an older row but not the latest one
        let outcome = sync.update_or_insert(SheetRow::from(["3", "a"])).await.unwrap();
        assert_eq!(outcome, RowOutcome::Appended);

        let outcome = sync.update_or_insert(SheetRow::from(["4", "a"])).await.unwrap();
        assert_eq!(outcome, RowOutcome::AlreadyPresent);
        assert_eq!(store.rows().await.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let store = Arc::new(InMemorySheetStore::new());
        let sync = synchronizer(&store).await;
        store.set_fail_reads(true);

        let report = sync
            .update_or_insert(SheetRow::from(["k", "v"]))
            .await
            .unwrap_err();
        assert!(matches!(report.current_context(), SyncError::FetchFailed));
        assert_eq!(store.append_count(), 0);
    }

    #[tokio::test]
    async fn test_append_failure_is_reported() {
        let store = Arc::new(InMemorySheetStore::new());
        let sync = synchronizer(&store).await;
        store.set_fail_appends(true);

        let report = sync
            .update_or_insert(SheetRow::from(["k", "v"]))
            .await
            .unwrap_err();
        assert!(matches!(report.current_context(), SyncError::AppendFailed));
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_append_once() {
        let store = Arc::new(InMemorySheetStore::with_rows(vec![SheetRow::from(["0", "old"])]));
        let sync = Arc::new(synchronizer(&store).await);

        let updates = (0..8).map(|i| {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move {
                sync.update_or_insert(SheetRow::from(vec![i.to_string(), "new".to_string()]))
                    .await
                    .unwrap()
            })
        });
        let outcomes = futures::future::join_all(updates).await;

        let appended = outcomes
            .into_iter()
            .map(Result::unwrap)
            .filter(|outcome| *outcome == RowOutcome::Appended)
            .count();
        assert_eq!(appended, 1);
        assert_eq!(store.append_count(), 1);
    }

    #[tokio::test]
    async fn test_row_handler_wraps_errors() {
        let store = Arc::new(InMemorySheetStore::new());
        let sync = synchronizer(&store).await;
        store.set_fail_reads(true);

        let report = sync.handle_row(SheetRow::from(["k", "v"])).await.unwrap_err();
        assert!(matches!(
            report.current_context(),
            RowHandlerError::HandlingFailed { .. }
        ));
    }
}
