//! User settings stored as a JSON document next to the activity data. Missing keys take their
//! defaults and unknown keys are kept as they are, so the file can be edited by hand.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::fs::operations::{read_json_locked, write_json_locked};

/// Longest accepted interval setting. Longer values in a hand edited file are cut to this.
pub const MAX_INTERVAL: Duration = Duration::weeks(52);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Console,
    Desktop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reminders_enabled: bool,
    pub break_reminder_enabled: bool,
    /// Minutes of activity before a break reminder.
    pub break_interval: u64,
    pub app_usage_warnings: bool,
    /// Hours on an entertainment application before a usage alert.
    pub entertainment_threshold: f64,
    /// Lowercase substrings marking an application as entertainment.
    pub entertainment_keywords: Vec<String>,
    pub idle_warning_enabled: bool,
    /// Minutes of idle time before an idle alert.
    pub idle_threshold: u64,
    /// Seconds between samples.
    pub tracking_interval: u64,
    /// Minutes between reminder checks.
    pub popup_interval: u64,
    /// Seconds between saves of the activity data.
    pub save_interval: u64,
    pub max_saved_logs: usize,
    pub notifier: NotifierKind,
    /// Process names to look for when no foreground window is available.
    pub tracked_processes: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminders_enabled: true,
            break_reminder_enabled: true,
            break_interval: 30,
            app_usage_warnings: true,
            entertainment_threshold: 2.0,
            entertainment_keywords: [
                "chrome", "firefox", "discord", "steam", "spotify", "youtube", "netflix", "edge",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            idle_warning_enabled: true,
            idle_threshold: 15,
            tracking_interval: 5,
            popup_interval: 30,
            save_interval: 10,
            max_saved_logs: 1000,
            notifier: NotifierKind::Console,
            tracked_processes: vec![],
            extra: BTreeMap::new(),
        }
    }
}

fn clamped_minutes(minutes: u64) -> Duration {
    i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .map_or(MAX_INTERVAL, |v| v.min(MAX_INTERVAL))
}

fn clamped_seconds(seconds: u64) -> Duration {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .map_or(MAX_INTERVAL, |v| v.min(MAX_INTERVAL))
}

impl Settings {
    pub fn break_period(&self) -> Duration {
        clamped_minutes(self.break_interval)
    }

    /// Never zero, which would check on every sample.
    pub fn popup_period(&self) -> Duration {
        clamped_minutes(self.popup_interval.max(1))
    }

    pub fn save_period(&self) -> Duration {
        clamped_seconds(self.save_interval)
    }

    /// Sampling period for the collector, at least one second.
    pub fn tracking_period(&self) -> std::time::Duration {
        let max = MAX_INTERVAL.num_seconds().unsigned_abs();
        std::time::Duration::from_secs(self.tracking_interval.clamp(1, max))
    }

    /// Rejects intervals longer than [MAX_INTERVAL].
    pub fn validate(&self) -> Result<()> {
        let max_minutes = MAX_INTERVAL.num_minutes().unsigned_abs();
        let max_seconds = MAX_INTERVAL.num_seconds().unsigned_abs();
        let checks = [
            ("break_interval", self.break_interval, max_minutes),
            ("idle_threshold", self.idle_threshold, max_minutes),
            ("popup_interval", self.popup_interval, max_minutes),
            ("tracking_interval", self.tracking_interval, max_seconds),
            ("save_interval", self.save_interval, max_seconds),
        ];
        for (key, value, max) in checks {
            if value > max {
                bail!("{key} is {value}, at most {max} is allowed");
            }
        }
        if !self.entertainment_threshold.is_finite() || self.entertainment_threshold < 0. {
            bail!("entertainment_threshold should be a non-negative number of hours");
        }
        Ok(())
    }
}

pub struct SettingsManager {
    path: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Loads settings from `path`. A missing or unreadable file falls back to defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings = Self::read(&path).await;
        Self { path, settings }
    }

    async fn read(path: &Path) -> Settings {
        match read_json_locked::<Settings>(path).await {
            Ok(Some(settings)) => {
                info!("Settings loaded and merged with defaults");
                settings
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                error!("Error loading settings from {path:?}: {e:?}");
                Settings::default()
            }
        }
    }

    /// Picks up changes made to the file by another process.
    pub async fn reload(&mut self) {
        self.settings = Self::read(&self.path).await;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// All settings as a JSON object, known and unknown keys alike.
    pub fn as_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.settings)?)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match self.as_value() {
            Ok(Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }

    /// Updates one key and saves immediately. Known keys are checked against their type and range.
    pub async fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let Value::Object(mut map) = self.as_value()? else {
            return Err(anyhow!("Settings should serialize into an object"));
        };
        map.insert(key.to_string(), value);
        let settings: Settings = serde_json::from_value(Value::Object(map))
            .map_err(|e| anyhow!("Invalid value for setting {key}: {e}"))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid value for setting {key}: {e}"))?;
        self.settings = settings;
        self.save().await
    }

    pub async fn save(&self) -> Result<()> {
        write_json_locked(&self.path, &self.settings)
            .await
            .inspect_err(|e| error!("Error saving settings: {e:?}"))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::Duration;
    use serde_json::json;
    use tempfile::tempdir;

    use super::{NotifierKind, Settings, SettingsManager, MAX_INTERVAL};

    #[tokio::test]
    async fn defaults_without_file() -> Result<()> {
        let dir = tempdir()?;
        let manager = SettingsManager::load(dir.path().join("settings.json")).await;

        assert!(manager.settings().reminders_enabled);
        assert_eq!(manager.get("break_interval"), Some(json!(30)));
        assert_eq!(manager.settings().notifier, NotifierKind::Console);
        Ok(())
    }

    #[tokio::test]
    async fn partial_file_is_merged_with_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"break_interval": 45, "custom": "kept"}"#)?;

        let manager = SettingsManager::load(path).await;

        assert_eq!(manager.settings().break_interval, 45);
        assert_eq!(manager.settings().idle_threshold, 15);
        assert_eq!(manager.get("custom"), Some(json!("kept")));
        Ok(())
    }

    #[tokio::test]
    async fn broken_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json")?;

        let manager = SettingsManager::load(path).await;
        assert_eq!(manager.settings(), &Settings::default());
        Ok(())
    }

    #[tokio::test]
    async fn set_and_get_arbitrary_key() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        let mut manager = SettingsManager::load(path.clone()).await;

        manager.set("test_key", json!("test_value")).await?;
        manager.set("tracking_interval", json!(2)).await?;
        assert_eq!(manager.get("test_key"), Some(json!("test_value")));

        let reloaded = SettingsManager::load(path).await;
        assert_eq!(reloaded.get("test_key"), Some(json!("test_value")));
        assert_eq!(reloaded.settings().tracking_interval, 2);
        Ok(())
    }

    #[tokio::test]
    async fn known_key_with_wrong_type_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut manager = SettingsManager::load(dir.path().join("settings.json")).await;

        assert!(manager.set("break_interval", json!("soon")).await.is_err());
        assert_eq!(manager.settings().break_interval, 30);
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_interval_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        let mut manager = SettingsManager::load(path.clone()).await;

        assert!(manager
            .set("break_interval", json!(1_000_000_000_000_000u64))
            .await
            .is_err());
        assert!(manager.set("save_interval", json!(u64::MAX)).await.is_err());
        assert!(manager.set("entertainment_threshold", json!(-1.0)).await.is_err());
        assert_eq!(manager.settings(), &Settings::default());
        assert!(!path.exists());

        manager.set("break_interval", json!(60 * 24 * 7)).await?;
        assert_eq!(manager.settings().break_interval, 60 * 24 * 7);
        Ok(())
    }

    #[test]
    fn periods_from_hand_edited_values_are_clamped() {
        let settings = Settings {
            break_interval: 1_000_000_000_000_000,
            popup_interval: 0,
            save_interval: u64::MAX,
            tracking_interval: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        assert_eq!(settings.break_period(), MAX_INTERVAL);
        assert_eq!(settings.popup_period(), Duration::minutes(1));
        assert_eq!(settings.save_period(), MAX_INTERVAL);
        assert_eq!(settings.tracking_period(), std::time::Duration::from_secs(1));

        let settings = Settings {
            tracking_interval: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            settings.tracking_period(),
            std::time::Duration::from_secs(MAX_INTERVAL.num_seconds() as u64)
        );
    }

    #[test]
    fn default_periods() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.break_period(), Duration::minutes(30));
        assert_eq!(settings.popup_period(), Duration::minutes(30));
        assert_eq!(settings.save_period(), Duration::seconds(10));
        assert_eq!(settings.tracking_period(), std::time::Duration::from_secs(5));
    }
}
