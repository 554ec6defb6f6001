use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::utils::percentage::Percentage;

use super::storage::{
    entities::{ActivityDataEntity, ActivityLogEntry, SWITCHED_TO},
    record_event::RecordEvent,
};

pub const TOP_APPS_COUNT: usize = 5;

/// Usage of a single application in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppUsage {
    pub app_name: Arc<str>,
    pub seconds: f64,
}

/// Snapshot of the tracker state at some moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityStatistics {
    /// Seconds since the session start. Never below 1 so ratios stay defined.
    pub total_time: f64,
    pub active_time: f64,
    pub idle_time: f64,
    pub activities: BTreeMap<String, f64>,
    pub top_apps: Vec<AppUsage>,
}

impl ActivityStatistics {
    pub fn productivity(&self) -> Percentage {
        Percentage::of(self.active_time, self.total_time)
    }
}

/// Accumulates time per application from collected samples and keeps the activity log.
pub struct ActivityTracker {
    data: ActivityDataEntity,
    current_activity: Option<String>,
    last_check: DateTime<Utc>,
}

impl ActivityTracker {
    /// Continues from previously stored data. Time before `now` isn't attributed to anything.
    pub fn new(data: ActivityDataEntity, now: DateTime<Utc>) -> Self {
        Self {
            data,
            current_activity: None,
            last_check: now,
        }
    }

    /// Attributes the time since the previous sample to the sampled application, or to idle time
    /// when nothing was sampled. A change of application appends a record to the log.
    pub fn track(&mut self, event: &RecordEvent) {
        let delta = seconds_between(self.last_check, event.timestamp);

        match &event.activity {
            Some(activity) => {
                *self
                    .data
                    .activities
                    .entry(activity.app_name.to_string())
                    .or_insert(0.) += delta;
                self.data.active_time += delta;

                if self.current_activity.as_deref() != Some(&*activity.app_name) {
                    debug!("Switched to {}", activity.app_name);
                    self.data.daily_logs.push(ActivityLogEntry {
                        timestamp: event.timestamp,
                        app_name: activity.app_name.to_string(),
                        window_title: activity.window_title.to_string(),
                        action: SWITCHED_TO.into(),
                    });
                    self.current_activity = Some(activity.app_name.to_string());
                }
            }
            None => self.data.idle_time += delta,
        }

        self.last_check = event.timestamp;
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> ActivityStatistics {
        ActivityStatistics {
            total_time: seconds_between(self.data.session_start, now).max(1.),
            active_time: self.data.active_time,
            idle_time: self.data.idle_time,
            activities: self.data.activities.clone(),
            top_apps: self.top_apps(TOP_APPS_COUNT),
        }
    }

    /// The `n` most used applications, longest first.
    pub fn top_apps(&self, n: usize) -> Vec<AppUsage> {
        let mut apps = self
            .data
            .activities
            .iter()
            .map(|(name, seconds)| AppUsage {
                app_name: name.as_str().into(),
                seconds: *seconds,
            })
            .collect::<Vec<_>>();
        apps.sort_by(|a, b| b.seconds.total_cmp(&a.seconds));
        apps.truncate(n);
        apps
    }

    /// The last `n` records, most recent first.
    pub fn recent_logs(&self, n: usize) -> Vec<&ActivityLogEntry> {
        self.data.daily_logs.iter().rev().take(n).collect()
    }

    pub fn logs(&self) -> &[ActivityLogEntry] {
        &self.data.daily_logs
    }

    /// Drops all collected data and starts a new session at `now`.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.data = ActivityDataEntity::empty(now);
        self.current_activity = None;
        self.last_check = now;
    }

    /// Document to persist. Only the last `max_logs` records are kept.
    pub fn snapshot(&self, max_logs: usize) -> ActivityDataEntity {
        let skip = self.data.daily_logs.len().saturating_sub(max_logs);
        ActivityDataEntity {
            activities: self.data.activities.clone(),
            idle_time: self.data.idle_time,
            active_time: self.data.active_time,
            session_start: self.data.session_start,
            daily_logs: self.data.daily_logs[skip..].to_vec(),
        }
    }
}

/// Seconds from `from` to `to`, clamped at zero when the clock went backwards.
fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = (to - from).num_milliseconds() as f64 / 1000.;
    delta.max(0.)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{
        daemon::storage::{entities::ActivityDataEntity, record_event::RecordEvent},
        window_api::ForegroundActivity,
    };

    use super::ActivityTracker;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 7, 4, 9, 0, 0).unwrap()
    }

    fn event(seconds: i64, app: Option<&str>) -> RecordEvent {
        RecordEvent {
            activity: app.map(|app| ForegroundActivity {
                app_name: app.into(),
                window_title: format!("{app} title").into(),
            }),
            timestamp: start() + Duration::seconds(seconds),
        }
    }

    fn tracker() -> ActivityTracker {
        ActivityTracker::new(ActivityDataEntity::empty(start()), start())
    }

    #[test]
    fn new_tracker_is_empty() {
        let tracker = tracker();
        let stats = tracker.statistics(start());
        assert_eq!(stats.idle_time, 0.);
        assert_eq!(stats.active_time, 0.);
        assert!(stats.activities.is_empty());
        assert_eq!(stats.total_time, 1.);
    }

    #[test]
    fn switching_apps_appends_records_in_order() {
        let mut tracker = tracker();
        for e in [
            event(5, Some("code")),
            event(10, Some("code")),
            event(15, Some("firefox")),
            event(20, Some("code")),
        ] {
            tracker.track(&e);
        }

        let apps = tracker
            .logs()
            .iter()
            .map(|v| v.app_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(apps, vec!["code", "firefox", "code"]);
        assert_eq!(tracker.logs()[1].timestamp, start() + Duration::seconds(15));

        let stats = tracker.statistics(start() + Duration::seconds(20));
        assert_eq!(stats.activities["code"], 15.);
        assert_eq!(stats.activities["firefox"], 5.);
        assert_eq!(stats.active_time, 20.);
        assert_eq!(*stats.productivity(), 100.);
    }

    #[test]
    fn missing_activity_counts_as_idle() {
        let mut tracker = tracker();
        tracker.track(&event(5, None));
        tracker.track(&event(12, Some("code")));
        tracker.track(&event(20, None));

        let stats = tracker.statistics(start() + Duration::seconds(20));
        assert_eq!(stats.idle_time, 13.);
        assert_eq!(stats.active_time, 7.);
        assert_eq!(tracker.logs().len(), 1);
    }

    #[test]
    fn clock_going_backwards_credits_nothing_for_that_sample() {
        let mut tracker = tracker();
        tracker.track(&event(10, Some("code")));
        tracker.track(&event(3, Some("code")));
        tracker.track(&event(12, Some("code")));

        assert_eq!(tracker.statistics(start()).activities["code"], 19.);
    }

    #[test]
    fn time_after_a_backwards_jump_is_still_counted() {
        let mut tracker = tracker();
        tracker.track(&event(3600, Some("code")));
        tracker.track(&event(0, None));
        tracker.track(&event(1800, Some("code")));

        let stats = tracker.statistics(start());
        assert_eq!(stats.activities["code"], 5400.);
        assert_eq!(stats.idle_time, 0.);
    }

    #[test]
    fn top_apps_are_sorted_and_limited() {
        let mut data = ActivityDataEntity::empty(start());
        for (i, app) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
            data.activities.insert(app.into(), i as f64);
        }
        let tracker = ActivityTracker::new(data, start());

        let top = tracker
            .top_apps(5)
            .into_iter()
            .map(|v| v.app_name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(top, vec!["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut tracker = tracker();
        tracker.track(&event(100, Some("test.exe")));
        tracker.track(&event(110, None));

        let later = start() + Duration::seconds(200);
        tracker.clear(later);

        let stats = tracker.statistics(later);
        assert!(stats.activities.is_empty());
        assert_eq!(stats.idle_time, 0.);
        assert!(tracker.logs().is_empty());
        assert_eq!(tracker.snapshot(1000).session_start, later);
    }

    #[test]
    fn snapshot_keeps_latest_records() {
        let mut tracker = tracker();
        for i in 0..6 {
            let app = if i % 2 == 0 { "a" } else { "b" };
            tracker.track(&event(i, Some(app)));
        }

        let snapshot = tracker.snapshot(4);
        assert_eq!(snapshot.daily_logs.len(), 4);
        assert_eq!(snapshot.daily_logs, tracker.logs()[2..].to_vec());
        assert_eq!(tracker.recent_logs(2)[0].timestamp, start() + Duration::seconds(5));
    }
}
