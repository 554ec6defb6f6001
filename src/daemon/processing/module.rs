use anyhow::Result;

use crate::daemon::storage::record_event::RecordEvent;

/// Consumer of collected samples. Processing stops calling it once the collector is gone, after
/// which `finalize` gets a chance to persist whatever is left.
pub trait EventProcessor {
    fn process_next(&mut self, message: RecordEvent) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
