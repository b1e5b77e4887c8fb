//! SQLite database modules.
//!
//! Connection management, the `reservations` schema and its Diesel row type.

pub mod connection;
pub mod model;
pub mod schema;
