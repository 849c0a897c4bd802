//! libSQL persistence for records

mod connection;
mod migrations;
mod record_repository;

pub use connection::Database;
pub use record_repository::LibSqlRecordStore;
