use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, Instrument};

use crate::{
    daemon::storage::record_event::RecordEvent, utils::clock::Clock, window_api::ActivitySource,
};

/// Polls the [ActivitySource] on a fixed interval and forwards samples to processing.
pub struct DataCollectionModule {
    next: mpsc::Sender<RecordEvent>,
    source: Box<dyn ActivitySource>,
    shutdown: CancellationToken,
    collection_frequency: Duration,
    time_provider: Box<dyn Clock>,
}

impl DataCollectionModule {
    pub fn new(
        next: mpsc::Sender<RecordEvent>,
        source: Box<dyn ActivitySource>,
        shutdown: CancellationToken,
        collection_frequency: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            source,
            shutdown,
            collection_frequency,
            time_provider,
        }
    }

    fn collect_data(&mut self) -> Result<RecordEvent> {
        let activity = self.source.sample()?;
        Ok(RecordEvent {
            activity,
            timestamp: self.time_provider.time(),
        })
    }

    /// Executes the collector event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut collection_point = self.time_provider.instant();
        loop {
            collection_point += self.collection_frequency;

            match self.collect_data() {
                Ok(record) => {
                    debug!("Sending sample {:?}", record);
                    self.next
                        .send(record)
                        .instrument(info_span!("Sending collected sample"))
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
                Err(e) => {
                    error!("Encountered an error during collection {:?}", e)
                }
            }

            tokio::select! {
                // Cancelation drops the sender, which in turn lets processing drain and finish.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(collection_point) => ()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        utils::clock::SystemClock,
        window_api::{ForegroundActivity, MockActivitySource},
    };

    use super::DataCollectionModule;

    #[tokio::test(start_paused = true)]
    async fn failed_samples_are_skipped() -> Result<()> {
        let mut source = MockActivitySource::new();
        let mut calls = 0;
        source.expect_sample().returning(move || {
            calls += 1;
            if calls % 2 == 0 {
                Err(anyhow!("window vanished"))
            } else {
                Ok(Some(ForegroundActivity {
                    app_name: "code".into(),
                    window_title: "".into(),
                }))
            }
        });

        let (sender, mut receiver) = mpsc::channel(10);
        let shutdown = CancellationToken::new();
        let collector = DataCollectionModule::new(
            sender,
            Box::new(source),
            shutdown.clone(),
            Duration::from_secs(1),
            Box::new(SystemClock),
        );

        let (result, ()) = tokio::join!(collector.run(), async {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            shutdown.cancel();
        });
        result?;

        let mut received = 0;
        while receiver.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 2);
        Ok(())
    }
}
