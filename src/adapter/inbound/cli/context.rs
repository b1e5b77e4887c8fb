//! Per-invocation state handed to command handlers.

use std::path::PathBuf;

use crate::domain::capacity::CapacityModel;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::persistence::build_store;
use crate::port::outbound::store::SnapshotStore;

/// Effective configuration plus the home directory defaults resolve under.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub home: PathBuf,
    capacity: CapacityModel,
}

impl Context {
    /// Validate the capacity section once for the whole invocation.
    pub fn new(config: Config, home: PathBuf) -> Result<Self> {
        let capacity = config.capacity_model()?;
        Ok(Self {
            config,
            home,
            capacity,
        })
    }

    #[must_use]
    pub fn capacity(&self) -> &CapacityModel {
        &self.capacity
    }

    /// Open the configured snapshot store.
    pub fn store(&self) -> Result<Box<dyn SnapshotStore>> {
        build_store(&self.config.storage, &self.capacity, &self.home)
    }
}
