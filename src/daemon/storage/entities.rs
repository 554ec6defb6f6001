use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Action recorded when the tracked application changes.
pub const SWITCHED_TO: &str = "switched_to";

/// One activity record. Records are append-only: once pushed into the log they are never
/// modified.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct ActivityLogEntry {
    pub timestamp: DateTime<Utc>,
    pub app_name: String,
    #[serde(default)]
    pub window_title: String,
    #[serde(default = "default_action")]
    pub action: String,
}

fn default_action() -> String {
    SWITCHED_TO.into()
}

/// The document stored on disk. Every field has a default so that partially written or older
/// files still load.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ActivityDataEntity {
    /// Seconds spent per application.
    pub activities: BTreeMap<String, f64>,
    pub idle_time: f64,
    pub active_time: f64,
    pub session_start: DateTime<Utc>,
    pub daily_logs: Vec<ActivityLogEntry>,
}

impl Default for ActivityDataEntity {
    fn default() -> Self {
        Self::empty(Utc::now())
    }
}

impl ActivityDataEntity {
    pub fn empty(session_start: DateTime<Utc>) -> Self {
        Self {
            activities: BTreeMap::new(),
            idle_time: 0.,
            active_time: 0.,
            session_start,
            daily_logs: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ActivityDataEntity, ActivityLogEntry, SWITCHED_TO};

    #[test]
    fn partial_document_takes_defaults() {
        let data: ActivityDataEntity = serde_json::from_str(
            r#"{"idle_time": 12.5, "daily_logs": [{"timestamp": "2018-07-04T10:00:00Z", "app_name": "vim"}]}"#,
        )
        .unwrap();

        assert_eq!(data.idle_time, 12.5);
        assert_eq!(data.active_time, 0.);
        assert!(data.activities.is_empty());
        assert_eq!(
            data.daily_logs,
            vec![ActivityLogEntry {
                timestamp: Utc.with_ymd_and_hms(2018, 7, 4, 10, 0, 0).unwrap(),
                app_name: "vim".into(),
                window_title: "".into(),
                action: SWITCHED_TO.into(),
            }]
        );
    }
}
