//! Application services (use cases).
//!
//! Turn raw tables into domain values and drive the engines against a
//! snapshot store.

pub mod booking;
pub mod columns;
pub mod daily;
pub mod ingest;
pub mod monthly;
pub mod table;
