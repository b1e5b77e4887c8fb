//! Storage-agnostic booking analytics.
//!
//! Everything in here is a pure computation over in-memory values. The
//! store, the table readers and the CLI live in the adapter layers.

pub mod capacity;
pub mod curve;
pub mod error;
pub mod forecast;
pub mod kpi;
pub mod pace;
pub mod pickup;
pub mod range;
pub mod room_type;
pub mod snapshot;

pub use capacity::CapacityModel;
pub use curve::{booking_curve, booking_curves, BookingCurve, BookingCurvePoint, CurveOutcome};
pub use error::DomainError;
pub use pickup::{pickup, PickUp, PickUpEntry, PickUpReport};
pub use range::StayRange;
pub use room_type::RoomType;
pub use snapshot::{Snapshot, SnapshotKey, SnapshotRecord};
