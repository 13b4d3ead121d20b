pub mod row_handler;
pub mod sheet_store;
