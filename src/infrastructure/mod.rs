//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic: configuration loading and wiring of the snapshot store.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Store construction from configuration

pub mod config;
pub mod factory;
