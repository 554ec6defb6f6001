use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

/// Reads a JSON document under a shared lock. A missing file yields `None`.
pub async fn read_json_locked<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{path:?} doesn't exist yet");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let mut file = file;
    let mut content = String::new();
    let read = file.read_to_string(&mut content).await;
    file.unlock_async().await?;
    read?;

    Ok(Some(serde_json::from_str(&content)?))
}

/// Overwrites `path` with pretty printed JSON. The file is truncated only after an exclusive lock
/// is held, so readers never observe a half-cleared file from another writer.
pub async fn write_json_locked<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let buffer = serde_json::to_vec_pretty(value)?;

    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await?;

    file.lock_exclusive()?;
    let result = overwrite(&mut file, &buffer).await;
    file.unlock_async().await?;
    result
}

async fn overwrite(file: &mut File, buffer: &[u8]) -> Result<()> {
    file.set_len(0).await?;
    file.rewind().await?;
    file.write_all(buffer).await?;
    file.flush().await?;
    file.sync_data().await?;
    Ok(())
}
