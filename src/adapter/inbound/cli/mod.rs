//! CLI module graph.

pub mod command;
pub mod config;
pub mod context;
pub mod curve;
pub mod diagnostic;
pub mod forecast;
pub mod import;
pub mod kpi;
pub mod output;
pub mod pace;
pub mod paths;
pub mod pickup;
pub mod snapshots;
