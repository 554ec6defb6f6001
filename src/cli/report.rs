use std::{
    fmt::Write as _,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Subcommand;

use crate::{
    daemon::{
        load_tracker,
        storage::{
            activity_storage::{ActivityStorage, JsonActivityStorage},
            export::{write_export, ActivityExport},
        },
        tracker::{ActivityStatistics, ActivityTracker},
    },
    settings::SettingsManager,
    utils::{
        dir::{ACTIVITY_DATA_FILE, SETTINGS_FILE},
        time::{export_file_name, format_duration},
    },
};

const SEPARATOR_WIDTH: usize = 60;
const TITLE_WIDTH: usize = 60;

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    #[command(about = "Show session statistics and top applications")]
    Stats {},
    #[command(about = "Show latest activity records, newest first")]
    Logs {
        #[arg(short = 'n', long, default_value_t = 50, help = "Number of records to show")]
        count: usize,
    },
    #[command(about = "Export activity records and statistics to a JSON file")]
    Export {
        #[arg(short, long, help = "Output file. Defaults to activity_logs_<timestamp>.json")]
        output: Option<PathBuf>,
    },
    #[command(about = "Clear all activity data")]
    Clear {
        #[arg(short, long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

pub async fn process_report_command(command: ReportCommand, dir: &Path) -> Result<()> {
    let storage = JsonActivityStorage::new(dir.join(ACTIVITY_DATA_FILE));
    let mut tracker = load_tracker(&storage, Utc::now()).await;

    match command {
        ReportCommand::Stats {} => {
            print!("{}", render_dashboard(&tracker.statistics(Utc::now())));
        }
        ReportCommand::Logs { count } => {
            print!("{}", render_logs(&tracker, count));
        }
        ReportCommand::Export { output } => {
            let now = Utc::now();
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(&Local::now())));
            write_export(
                &path,
                &ActivityExport {
                    logs: tracker.logs(),
                    statistics: tracker.statistics(now),
                    export_time: now,
                },
            )
            .await?;
            println!("Logs exported to {}", path.display());
        }
        ReportCommand::Clear { yes } => {
            if !yes && !confirm("Are you sure you want to clear all activity data?")? {
                println!("Nothing was cleared");
                return Ok(());
            }
            let settings = SettingsManager::load(dir.join(SETTINGS_FILE)).await;
            tracker.clear(Utc::now());
            storage
                .save(&tracker.snapshot(settings.settings().max_saved_logs))
                .await?;
            println!("All activity data has been cleared.");
        }
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Text of the statistics dashboard.
pub fn render_dashboard(stats: &ActivityStatistics) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut text = format!("Session Statistics\n{separator}\n\n");
    let _ = writeln!(text, "Total Session Time: {}", format_duration(stats.total_time));
    let _ = writeln!(text, "Active Time: {}", format_duration(stats.active_time));
    let _ = writeln!(text, "Idle Time: {}", format_duration(stats.idle_time));
    let _ = writeln!(text, "Productivity: {}", stats.productivity());

    let _ = write!(text, "\n{separator}\nTop Applications\n{separator}\n\n");
    for (i, app) in stats.top_apps.iter().enumerate() {
        let _ = writeln!(text, "{}. {}: {}", i + 1, app.app_name, format_duration(app.seconds));
    }
    text
}

/// The latest `count` records, one per line, newest first.
pub fn render_logs(tracker: &ActivityTracker, count: usize) -> String {
    tracker
        .recent_logs(count)
        .into_iter()
        .map(|entry| {
            let title = entry.window_title.chars().take(TITLE_WIDTH).collect::<String>();
            format!(
                "[{}] {}: {} - {}\n",
                entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                entry.action,
                entry.app_name,
                title
            )
        })
        .collect()
}
