//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!        ┌──────────────┐        ┌──────────────────────┐
//!  CLI ─▶│ application  │───────▶│ port::outbound::store│
//!        │  + domain    │        └──────────┬───────────┘
//!        └──────────────┘                   │
//!                          ┌────────────┬───┴────────┬──────────┐
//!                          ▼            ▼            ▼          ▼
//!                       sqlite      csv file     wide dir    memory
//! ```

pub mod outbound;

pub use outbound::store::SnapshotStore;
