//! telemetry/mod.rs
//! Counters kept by the `Primitives` facade and their serializable snapshot.
//!
//! Notes:
//! - Counters are plain integers owned by the facade; no atomics, no locks.
//! - Snapshots are immutable copies and safe to hand to exporters.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
