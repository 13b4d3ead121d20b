use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use error_stack::report;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    domain::sheets::{a1_notation::A1Notation, sheet_row::SheetRow},
    ports::sheet_store::{SheetStore, SheetStoreError},
};

/// Sheet kept in process memory. Every range maps to the same rows.
#[derive(Debug, Default)]
pub struct InMemorySheetStore {
    rows: RwLock<Vec<SheetRow>>,
    reads: AtomicUsize,
    appends: AtomicUsize,
    fail_reads: AtomicBool,
    fail_appends: AtomicBool,
}

impl InMemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<SheetRow>) -> Self {
        InMemorySheetStore {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    pub async fn rows(&self) -> Vec<SheetRow> {
        self.rows.read().await.clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl SheetStore for InMemorySheetStore {
    async fn read_rows(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<SheetRow>, SheetStoreError> {
        // Lets concurrent writers interleave like they would across a network round-trip.
        tokio::task::yield_now().await;

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(report!(SheetStoreError::ReadFailed)
                .attach_printable(format!("injected read failure for range {}", range)));
        }

        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.read().await.clone())
    }

    async fn append_row(
        &self,
        range: &A1Notation,
        row: &SheetRow,
    ) -> error_stack::Result<(), SheetStoreError> {
        tokio::task::yield_now().await;

        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(report!(SheetStoreError::AppendFailed)
                .attach_printable(format!("injected append failure for range {}", range)));
        }

        debug!(?row, %range, "Appending row in memory");
        self.rows.write().await.push(row.clone());
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
