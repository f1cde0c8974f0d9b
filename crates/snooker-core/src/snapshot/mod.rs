//! Ball census snapshots

pub mod report;
pub mod snapshot;

pub use report::snapshot_report;
pub use snapshot::Snapshot;
