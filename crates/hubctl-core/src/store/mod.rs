// ── State stores owned by the engine ──
//
// Plain synchronous containers. The engine's owner task is the only
// writer; everything here is free of I/O and locking.

pub mod config_store;
pub mod notifications;
pub mod throughput;

pub use config_store::{ConfigStore, DraftPatch};
pub use notifications::NotificationQueue;
pub use throughput::ThroughputHistory;
