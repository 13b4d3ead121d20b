pub mod sheet_synchronizer;
