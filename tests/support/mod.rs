#![allow(dead_code)]

use std::path::Path;

use chrono::NaiveDate;
use revpace::adapter::outbound::file::{CsvSnapshotStore, WideDirectoryStore};
use revpace::adapter::outbound::memory::MemorySnapshotStore;
use revpace::adapter::outbound::sqlite::SqliteSnapshotStore;
use revpace::domain::{CapacityModel, RoomType, Snapshot, SnapshotRecord};
use revpace::port::SnapshotStore;
use tempfile::TempDir;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn rt(code: &str) -> RoomType {
    RoomType::try_new(code).unwrap()
}

/// Snapshot from `(stay_date, room_type, quantity)` cells.
pub fn snapshot(on: NaiveDate, cells: &[(NaiveDate, &str, u32)]) -> Snapshot {
    let mut snapshot = Snapshot::new(on);
    for (stay, code, qty) in cells {
        snapshot.insert(*stay, rt(code), *qty);
    }
    snapshot
}

pub fn record(stay: NaiveDate, code: &str, qty: u32, on: NaiveDate) -> SnapshotRecord {
    SnapshotRecord {
        stay_date: stay,
        room_type: rt(code),
        quantity: qty,
        snapshot_date: on,
    }
}

/// One store per backend, each in its own temp directory.
pub struct Backends {
    _dir: TempDir,
    pub stores: Vec<(&'static str, Box<dyn SnapshotStore>)>,
}

impl Backends {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let stores: Vec<(&'static str, Box<dyn SnapshotStore>)> = vec![
            (
                "sqlite",
                Box::new(SqliteSnapshotStore::open(root.join("revpace.db")).unwrap()),
            ),
            ("csv", Box::new(CsvSnapshotStore::new(root.join("reservas.csv")))),
            (
                "wide",
                Box::new(WideDirectoryStore::new(
                    root.join("snapshots"),
                    CapacityModel::default(),
                )),
            ),
            ("memory", Box::new(MemorySnapshotStore::new())),
        ];
        Self { _dir: dir, stores }
    }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
