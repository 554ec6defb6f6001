use anyhow::Result;

/// Tracking runs on a single thread. Collection, processing and reminders are cooperative tasks
/// on the same runtime.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
