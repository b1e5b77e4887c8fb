//! File-backed snapshot stores.

mod long;
mod wide;

pub use long::CsvSnapshotStore;
pub use wide::WideDirectoryStore;

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `path` through a temporary sibling and rename it into place.
///
/// The target is only touched once `write` has succeeded; on failure the
/// temporary file is removed and the old content stays.
pub(crate) fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
    }
    let tmp = temp_sibling(path);
    let result: Result<()> = File::create(&tmp)
        .map_err(|e| StoreError::Io(e).into())
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all().map_err(StoreError::Io)?;
            Ok(())
        });

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path).map_err(StoreError::Io)?;
    Ok(())
}
