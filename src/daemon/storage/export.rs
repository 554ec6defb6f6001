use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{daemon::tracker::ActivityStatistics, fs::operations::write_json_locked};

use super::entities::ActivityLogEntry;

/// Standalone export of the activity log together with statistics at export time.
#[derive(Debug, Serialize)]
pub struct ActivityExport<'a> {
    pub logs: &'a [ActivityLogEntry],
    pub statistics: ActivityStatistics,
    pub export_time: DateTime<Utc>,
}

pub async fn write_export(path: &Path, export: &ActivityExport<'_>) -> Result<()> {
    write_json_locked(path, export).await?;
    info!("Exported {} log entries to {path:?}", export.logs.len());
    Ok(())
}
