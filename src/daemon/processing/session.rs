use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::{
    daemon::{
        storage::{activity_storage::ActivityStorage, record_event::RecordEvent},
        tracker::ActivityTracker,
    },
    reminders::{notifier::Notifier, ReminderManager},
    settings::SettingsManager,
    utils::clock::Clock,
};

use super::module::EventProcessor;

/// Processor behind a tracking session. Feeds samples into the [ActivityTracker], saves the data
/// periodically and runs reminder checks.
pub struct SessionProcessor<S: ActivityStorage> {
    tracker: ActivityTracker,
    storage: S,
    settings: SettingsManager,
    reminders: ReminderManager,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    last_save: Option<DateTime<Utc>>,
    next_reminder_check: Option<DateTime<Utc>>,
}

impl<S: ActivityStorage> SessionProcessor<S> {
    pub fn new(
        tracker: ActivityTracker,
        storage: S,
        settings: SettingsManager,
        notifier: Box<dyn Notifier>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            tracker,
            storage,
            settings,
            reminders: ReminderManager::new(),
            notifier,
            clock,
            last_save: None,
            next_reminder_check: None,
        }
    }

    async fn save(&mut self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let snapshot = self.tracker.snapshot(self.settings.settings().max_saved_logs);
        self.last_save = Some(now);
        self.storage
            .save(&snapshot)
            .await
            .inspect_err(|e| error!("Error saving data: {e:?}"))
    }

    fn save_due(&self, now: DateTime<Utc>) -> bool {
        let interval = self.settings.settings().save_period();
        self.last_save.map_or(true, |last| now - last >= interval)
    }

    async fn check_reminders(&mut self, now: DateTime<Utc>) {
        if self.next_reminder_check.is_some_and(|next| now < next) {
            return;
        }
        self.settings.reload().await;

        let settings = self.settings.settings().clone();
        let stats = self.tracker.statistics(now);
        let shown = self
            .reminders
            .check_and_notify(&stats, &settings, now, self.notifier.as_ref())
            .await;
        if !shown.is_empty() {
            info!("Shown {} reminders", shown.len());
        }

        self.next_reminder_check = Some(now + settings.popup_period());
    }
}

impl<S: ActivityStorage> EventProcessor for SessionProcessor<S> {
    async fn process_next(&mut self, message: RecordEvent) -> anyhow::Result<()> {
        let now = message.timestamp;
        self.tracker.track(&message);

        self.check_reminders(now).await;

        if self.save_due(now) {
            self.save(now).await?;
        }
        Ok(())
    }

    async fn finalize(&mut self) -> anyhow::Result<()> {
        let now = self.clock.time();
        self.save(now).await?;
        info!("Saved activity data on shutdown");
        Ok(())
    }
}
