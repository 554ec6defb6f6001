use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Source of wall-clock and monotonic time. Collection timing and record timestamps go through
/// this so tests can control both.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall-clock time used for record timestamps.
    fn time(&self) -> DateTime<Utc>;

    /// Monotonic time used for scheduling ticks.
    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
