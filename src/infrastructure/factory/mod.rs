//! Factory modules for building infrastructure components.
//!
//! # Submodules
//!
//! - [`persistence`] - Snapshot store construction

pub mod persistence;
