//! SQLite snapshot store using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteSnapshotStore;
