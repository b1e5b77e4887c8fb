//! Revpace - booking pace and pick-up analytics for a single campsite.
//!
//! Daily reservation exports are stored as dated snapshots of "room-nights on
//! the books" per stay date and room type. Comparing snapshots gives the
//! pick-up (bookings gained or lost between two days); following one stay
//! range across every snapshot gives its booking curve.
//!
//! # Architecture
//!
//! - **`domain`** - Snapshots, pick-up and booking-curve engines, capacity,
//!   and the price forecast, KPI and pace reports. Pure functions over values.
//! - **`port`** - The [`port::SnapshotStore`] trait.
//! - **`application`** - Upload normalization and the booking use cases.
//! - **`adapter`** - The CLI, and the SQLite, CSV, wide-directory and
//!   in-memory stores.
//! - **`infrastructure`** - Configuration, logging and the store factory.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use revpace::adapter::outbound::memory::MemorySnapshotStore;
//! use revpace::application::booking::BookingService;
//! use revpace::application::ingest::normalize;
//! use revpace::application::table::Table;
//! use revpace::domain::CapacityModel;
//!
//! let store = MemorySnapshotStore::new();
//! let capacity = CapacityModel::default();
//! let service = BookingService::new(&store, &capacity);
//!
//! let table = Table::new(
//!     vec!["fecha".into(), "N-4".into()],
//!     vec![vec!["2025-08-01".into(), "12".into()]],
//! );
//! let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! let preview = service.preview(normalize(&table, date, &capacity).unwrap()).unwrap();
//! assert_eq!(service.commit(&preview).unwrap(), 1);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
