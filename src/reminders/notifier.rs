use std::time::Duration;

use ansi_term::Colour;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use super::{Reminder, ReminderKind};

/// How the user reacted to a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationResponse {
    Dismissed,
    Snoozed,
}

/// Shows reminders to the user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, reminder: &Reminder) -> NotificationResponse;
}

/// Prints reminders to stdout and the log.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, reminder: &Reminder) -> NotificationResponse {
        let colour = match reminder.kind {
            ReminderKind::Info => Colour::Cyan,
            ReminderKind::Warning => Colour::Yellow,
        };
        println!("{} {}", colour.bold().paint(reminder.title.as_str()), reminder.message);
        match reminder.kind {
            ReminderKind::Info => info!("{}: {}", reminder.title, reminder.message),
            ReminderKind::Warning => warn!("{}: {}", reminder.title, reminder.message),
        }
        NotificationResponse::Dismissed
    }
}

const SNOOZE_ACTION: &str = "snooze";

/// Break reminders wait at most this long for the user to pick an action.
const ACTION_TIMEOUT: Duration = Duration::from_secs(120);

/// Shows desktop pop-ups through `notify-send`. Falls back to [ConsoleNotifier] when the command
/// is missing or fails.
pub struct DesktopNotifier {
    fallback: ConsoleNotifier,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            fallback: ConsoleNotifier,
        }
    }

    fn command(reminder: &Reminder) -> Command {
        let urgency = match reminder.kind {
            ReminderKind::Info => "normal",
            ReminderKind::Warning => "critical",
        };
        let mut command = Command::new("notify-send");
        command
            .arg(format!("--urgency={urgency}"))
            .arg(format!("--app-name={}", env!("CARGO_PKG_NAME")));
        if reminder.offer_snooze {
            command
                .arg(format!("--action={SNOOZE_ACTION}=Snooze 5 minutes"))
                .arg("--wait");
        }
        command.arg(&reminder.title).arg(&reminder.message);
        command.kill_on_drop(true);
        command
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, reminder: &Reminder) -> NotificationResponse {
        let output = tokio::time::timeout(ACTION_TIMEOUT, Self::command(reminder).output()).await;
        match output {
            Ok(Ok(output)) if output.status.success() => {
                info!("Shown {}", reminder.title);
                if String::from_utf8_lossy(&output.stdout).trim() == SNOOZE_ACTION {
                    NotificationResponse::Snoozed
                } else {
                    NotificationResponse::Dismissed
                }
            }
            Ok(Ok(output)) => {
                warn!(
                    "notify-send exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                self.fallback.notify(reminder).await
            }
            Ok(Err(e)) => {
                warn!("Failed to run notify-send {e:?}");
                self.fallback.notify(reminder).await
            }
            Err(_) => NotificationResponse::Dismissed,
        }
    }
}
