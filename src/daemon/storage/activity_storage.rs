use std::{future::Future, ops::Deref, path::PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::fs::operations::{read_json_locked, write_json_locked};

use super::entities::ActivityDataEntity;

/// Interface for abstracting storage of activity data.
pub trait ActivityStorage {
    /// Loads the stored document. Missing data is not an error and yields `None`.
    fn load(&self) -> impl Future<Output = Result<Option<ActivityDataEntity>>>;

    /// Replaces the stored document.
    fn save(&self, data: &ActivityDataEntity) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> ActivityStorage for T
where
    T::Target: ActivityStorage,
{
    fn load(&self) -> impl Future<Output = Result<Option<ActivityDataEntity>>> {
        self.deref().load()
    }

    fn save(&self, data: &ActivityDataEntity) -> impl Future<Output = Result<()>> {
        self.deref().save(data)
    }
}

/// The main realization of [ActivityStorage]. Keeps the document in a single JSON file.
pub struct JsonActivityStorage {
    path: PathBuf,
}

impl JsonActivityStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ActivityStorage for JsonActivityStorage {
    async fn load(&self) -> Result<Option<ActivityDataEntity>> {
        let data = read_json_locked::<ActivityDataEntity>(&self.path).await?;
        if data.is_some() {
            info!("Loaded previous activity data from {:?}", self.path);
        }
        Ok(data)
    }

    async fn save(&self, data: &ActivityDataEntity) -> Result<()> {
        debug!(
            "Saving {} log entries into {:?}",
            data.daily_logs.len(),
            self.path
        );
        write_json_locked(&self.path, data).await
    }
}
