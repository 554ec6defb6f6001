//! Reminder rules. Each check looks at the current [ActivityStatistics] and produces the
//! reminders that are due; [ReminderManager] also remembers when the next break reminder is
//! allowed.

pub mod notifier;

use chrono::{DateTime, Duration, Utc};
use notifier::{ConsoleNotifier, DesktopNotifier, NotificationResponse, Notifier};
use tracing::debug;

use crate::{
    daemon::tracker::ActivityStatistics,
    settings::{NotifierKind, Settings},
};

pub const SNOOZE_DURATION: Duration = Duration::minutes(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderTopic {
    Break,
    Usage,
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub topic: ReminderTopic,
    pub kind: ReminderKind,
    pub title: String,
    pub message: String,
    /// The user may postpone this reminder.
    pub offer_snooze: bool,
}

#[derive(Debug, Default)]
pub struct ReminderManager {
    /// Earliest moment of the next break reminder. `None` means right away.
    next_break: Option<DateTime<Utc>>,
}

impl ReminderManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reminders that should be shown at `now`.
    pub fn check(
        &self,
        stats: &ActivityStatistics,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Vec<Reminder> {
        let mut reminders = vec![];
        if !settings.reminders_enabled {
            return reminders;
        }

        if settings.break_reminder_enabled {
            let work_minutes = stats.active_time / 60.;
            let break_due = self.next_break.map_or(true, |next| now >= next);
            if work_minutes >= settings.break_interval as f64 && break_due {
                reminders.push(Reminder {
                    topic: ReminderTopic::Break,
                    kind: ReminderKind::Info,
                    title: "Break Reminder".into(),
                    message: format!(
                        "You've been active for {work_minutes:.0} minutes. Time for a short break to rest your eyes and stretch!"
                    ),
                    offer_snooze: true,
                });
            }
        }

        if settings.app_usage_warnings {
            for (app, seconds) in &stats.activities {
                let hours = seconds / 3600.;
                let app_lower = app.to_lowercase();
                let entertainment = settings
                    .entertainment_keywords
                    .iter()
                    .any(|keyword| app_lower.contains(&keyword.to_lowercase()));
                if entertainment && hours > settings.entertainment_threshold {
                    reminders.push(Reminder {
                        topic: ReminderTopic::Usage,
                        kind: ReminderKind::Warning,
                        title: "Usage Alert".into(),
                        message: format!(
                            "You've spent {hours:.1} hours on {app} today. Consider focusing on productive tasks."
                        ),
                        offer_snooze: false,
                    });
                }
            }
        }

        if settings.idle_warning_enabled {
            let idle_minutes = stats.idle_time / 60.;
            if idle_minutes > settings.idle_threshold as f64 {
                reminders.push(Reminder {
                    topic: ReminderTopic::Idle,
                    kind: ReminderKind::Info,
                    title: "Idle Alert".into(),
                    message: format!(
                        "You've been idle for {idle_minutes:.0} minutes. Ready to get back to work?"
                    ),
                    offer_snooze: false,
                });
            }
        }

        reminders
    }

    /// Schedules the next break reminder after one was answered with `response`.
    pub fn respond(
        &mut self,
        response: NotificationResponse,
        settings: &Settings,
        now: DateTime<Utc>,
    ) {
        let next = match response {
            NotificationResponse::Snoozed => now + SNOOZE_DURATION,
            NotificationResponse::Dismissed => now + settings.break_period(),
        };
        debug!("Next break reminder at {next}");
        self.next_break = Some(next);
    }

    /// Shows every due reminder through `notifier`.
    pub async fn check_and_notify(
        &mut self,
        stats: &ActivityStatistics,
        settings: &Settings,
        now: DateTime<Utc>,
        notifier: &dyn Notifier,
    ) -> Vec<Reminder> {
        let reminders = self.check(stats, settings, now);
        for reminder in &reminders {
            let response = notifier.notify(reminder).await;
            if reminder.topic == ReminderTopic::Break {
                self.respond(response, settings, now);
            }
        }
        reminders
    }
}

/// Creates the notifier selected in settings.
pub fn create_notifier(kind: NotifierKind) -> Box<dyn Notifier> {
    match kind {
        NotifierKind::Console => Box::new(ConsoleNotifier),
        NotifierKind::Desktop => Box::new(DesktopNotifier::new()),
    }
}
