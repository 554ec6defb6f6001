use chrono::{DateTime, Utc};

use crate::window_api::ForegroundActivity;

/// A single sample taken by the collector. `activity` is `None` when nothing could be
/// determined, which counts as idle time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEvent {
    pub activity: Option<ForegroundActivity>,
    pub timestamp: DateTime<Utc>,
}
