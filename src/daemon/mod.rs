use std::{path::Path, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use collection::collector::DataCollectionModule;
use processing::{session::SessionProcessor, ProcessingModule};
use storage::{
    activity_storage::{ActivityStorage, JsonActivityStorage},
    entities::ActivityDataEntity,
    record_event::RecordEvent,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracker::ActivityTracker;
use tracing::{error, info};

use crate::{
    reminders::{create_notifier, notifier::Notifier},
    settings::SettingsManager,
    utils::{
        clock::{Clock, SystemClock},
        dir::{ACTIVITY_DATA_FILE, SETTINGS_FILE},
    },
    window_api::{ActivitySource, GenericActivitySource},
};

pub mod collection;
pub mod processing;
pub mod shutdown;
pub mod storage;
pub mod tracker;

/// Starts tracking with data kept in `dir`. Runs until Ctrl-C or SIGTERM.
pub async fn start_daemon(dir: &Path) -> Result<()> {
    let settings = SettingsManager::load(dir.join(SETTINGS_FILE)).await;
    let interval = settings.settings().tracking_period();
    let source = GenericActivitySource::new(settings.settings().tracked_processes.clone());
    let notifier = create_notifier(settings.settings().notifier);

    let shutdown_token = CancellationToken::new();
    let (sender, receiver) = mpsc::channel::<RecordEvent>(10);

    let collector = create_collector(sender, source, &shutdown_token, interval, SystemClock);
    let processor = create_processor(
        JsonActivityStorage::new(dir.join(ACTIVITY_DATA_FILE)),
        receiver,
        settings,
        notifier,
        SystemClock,
    )
    .await?;

    info!("Tracking started, sampling every {interval:?}");

    let (_, collection_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        collector.run(),
        processor.run(),
    );

    if let Err(collection_result) = &collection_result {
        error!("Collection module got an error {:?}", collection_result);
    }

    if let Err(processing_result) = &processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    info!("Tracking stopped");
    Ok(())
}

fn create_collector(
    sender: mpsc::Sender<RecordEvent>,
    source: impl ActivitySource + 'static,
    shutdown_token: &CancellationToken,
    interval: Duration,
    clock: impl Clock,
) -> DataCollectionModule {
    DataCollectionModule::new(
        sender,
        Box::new(source),
        shutdown_token.clone(),
        interval,
        Box::new(clock),
    )
}

/// Loads previous data, falling back to an empty session when it can't be read.
pub async fn load_tracker(storage: &impl ActivityStorage, now: DateTime<Utc>) -> ActivityTracker {
    let data = match storage.load().await {
        Ok(Some(data)) => data,
        Ok(None) => ActivityDataEntity::empty(now),
        Err(e) => {
            error!("Error loading data: {e:?}");
            ActivityDataEntity::empty(now)
        }
    };
    ActivityTracker::new(data, now)
}

async fn create_processor<S: ActivityStorage>(
    storage: S,
    receiver: mpsc::Receiver<RecordEvent>,
    settings: SettingsManager,
    notifier: Box<dyn Notifier>,
    clock: impl Clock,
) -> Result<ProcessingModule<SessionProcessor<S>>> {
    let tracker = load_tracker(&storage, clock.time()).await;
    let processor = SessionProcessor::new(tracker, storage, settings, notifier, Box::new(clock));
    Ok(ProcessingModule::new(receiver, processor))
}

#[cfg(test)]
mod daemon_tests {
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            create_collector, create_processor,
            storage::{
                activity_storage::{ActivityStorage, JsonActivityStorage},
                record_event::RecordEvent,
            },
        },
        reminders::notifier::{MockNotifier, NotificationResponse},
        settings::SettingsManager,
        utils::{clock::Clock, logging::TEST_LOGGING},
        window_api::{ForegroundActivity, MockActivitySource},
    };

    /// Wall clock that follows tokio's (paused) time.
    #[derive(Clone)]
    struct TestClock {
        start_time: DateTime<Utc>,
        reference: Instant,
    }

    impl TestClock {
        fn new() -> Self {
            Self {
                start_time: Utc.with_ymd_and_hms(2018, 7, 4, 9, 0, 0).unwrap(),
                reference: Instant::now(),
            }
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Utc> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    fn test_items() -> Vec<Option<ForegroundActivity>> {
        vec![
            Some(ForegroundActivity {
                app_name: "code".into(),
                window_title: "main.rs".into(),
            }),
            Some(ForegroundActivity {
                app_name: "code".into(),
                window_title: "lib.rs".into(),
            }),
            None,
            Some(ForegroundActivity {
                app_name: "firefox".into(),
                window_title: "docs".into(),
            }),
        ]
    }

    async fn run_session(dir: &std::path::Path, samples: usize, clock: TestClock) -> Result<()> {
        let mut source = MockActivitySource::new();
        let mut items = test_items().into_iter().cycle();
        source
            .expect_sample()
            .returning(move || Ok(items.next().flatten()))
            .times(samples);

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .returning(|_| NotificationResponse::Dismissed);

        let shutdown_token = CancellationToken::new();
        let (sender, receiver) = mpsc::channel::<RecordEvent>(10);
        let collector = create_collector(
            sender,
            source,
            &shutdown_token,
            Duration::from_millis(100),
            clock.clone(),
        );
        let settings = SettingsManager::load(dir.join("settings.json")).await;
        let processor = create_processor(
            JsonActivityStorage::new(dir.join("activity_data.json")),
            receiver,
            settings,
            Box::new(notifier),
            clock,
        )
        .await?;

        let (_, collection_result, processing_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(100 * (samples as u64 - 1) + 50)).await;
                shutdown_token.cancel()
            },
            collector.run(),
            processor.run(),
        );

        collection_result?;
        processing_result?;
        Ok(())
    }

    /// Smoke test of a whole session: samples flow from the source into the data file and a
    /// second session continues where the first one stopped.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let clock = TestClock::new();

        run_session(dir.path(), 4, clock.clone()).await?;

        let storage = JsonActivityStorage::new(dir.path().join("activity_data.json"));
        let data = storage.load().await?.expect("data should be saved");
        let apps = data
            .daily_logs
            .iter()
            .map(|v| v.app_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(apps, vec!["code", "firefox"]);
        assert_eq!(data.daily_logs[0].window_title, "main.rs");
        assert!(data.idle_time > 0.);

        run_session(dir.path(), 4, clock).await?;

        let data = storage.load().await?.expect("data should be saved");
        assert_eq!(data.daily_logs.len(), 4);
        Ok(())
    }
}
