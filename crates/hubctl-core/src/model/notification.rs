use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An agent-reported command failure, shown for a bounded time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Monotonically increasing; never reused within an engine.
    pub id: u64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
