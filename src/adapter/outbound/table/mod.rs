//! Tabular file I/O: reading spreadsheet exports and writing CSV reports.

pub mod export;
pub mod reader;
