use chrono::{DateTime, TimeZone};

/// Formats seconds as `1h 2m 3s`, dropping leading zero units.
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.) as u64;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Default name of an export file created at `moment`.
pub fn export_file_name<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("activity_logs_{}.json", moment.format("%Y%m%d_%H%M%S"))
}
