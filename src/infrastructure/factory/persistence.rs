//! Persistence factory for the snapshot store.

use std::path::Path;

use tracing::debug;

use crate::adapter::outbound::file::{CsvSnapshotStore, WideDirectoryStore};
use crate::adapter::outbound::sqlite::SqliteSnapshotStore;
use crate::domain::capacity::CapacityModel;
use crate::error::Result;
use crate::infrastructure::config::settings::{StorageBackend, StorageConfig};
use crate::port::outbound::store::SnapshotStore;

/// Open the configured store.
///
/// Without a configured path the backend's default location under `home` is
/// used; a configured path is taken as given.
pub fn build_store(
    storage: &StorageConfig,
    capacity: &CapacityModel,
    home: &Path,
) -> Result<Box<dyn SnapshotStore>> {
    let path = storage.resolved_path(home);
    debug!(backend = %storage.backend, path = %path.display(), "opening snapshot store");

    let store: Box<dyn SnapshotStore> = match storage.backend {
        StorageBackend::Sqlite => Box::new(SqliteSnapshotStore::open(&path)?),
        StorageBackend::Csv => Box::new(CsvSnapshotStore::new(path)),
        StorageBackend::Wide => Box::new(WideDirectoryStore::new(path, capacity.clone())),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn every_backend_opens_under_home() {
        let dir = TempDir::new().unwrap();
        for backend in [StorageBackend::Sqlite, StorageBackend::Csv, StorageBackend::Wide] {
            let storage = StorageConfig {
                backend,
                path: None,
            };
            let store = build_store(&storage, &CapacityModel::default(), dir.path()).unwrap();
            assert!(store.describe().starts_with(&backend.to_string()));
            assert!(store.read_all().unwrap().is_empty());
        }
    }

    #[test]
    fn configured_path_is_not_moved_under_home() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig {
            backend: StorageBackend::Csv,
            path: Some("reservas.csv".into()),
        };
        assert_eq!(
            storage.resolved_path(dir.path()),
            std::path::PathBuf::from("reservas.csv")
        );
        let store = build_store(&storage, &CapacityModel::default(), dir.path()).unwrap();
        assert_eq!(store.describe(), "csv:reservas.csv");
    }
}
