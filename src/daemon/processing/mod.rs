use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, trace};

use super::storage::record_event::RecordEvent;

pub mod module;
pub mod session;

/// Receives samples and hands them to an [EventProcessor]. Errors for a single sample are logged
/// and don't stop processing.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<RecordEvent>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<RecordEvent>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(record) = self.receiver.recv().await {
            trace!("Processing event {:?}", record);
            match self.processor.process_next(record.clone()).await {
                Ok(_) => {
                    debug!("Processed event at {}", record.timestamp)
                }
                Err(e) => {
                    error!("Error processing event {:?}: {e:?}", record)
                }
            }
        }

        self.receiver.close();
        self.processor.finalize().await
    }
}
