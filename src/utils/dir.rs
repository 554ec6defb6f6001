use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

const APPLICATION_DIR_NAME: &str = "activity-tracker";

pub const ACTIVITY_DATA_FILE: &str = "activity_data.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const LOGS_DIR: &str = "logs";

/// Resolves the application directory. Uses `%APPDATA%` on Windows and `$XDG_STATE_HOME` or
/// `$HOME/.local/state` elsewhere. The directory is created if it's missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = {
        #[cfg(windows)]
        {
            env::var("APPDATA")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("APPDATA should be present on Windows"))?
        }
        #[cfg(not(windows))]
        {
            env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?
        }
    };
    path.push(APPLICATION_DIR_NAME);
    ensure_dir(path)
}

/// Creates `path` if needed and returns it back.
pub fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

/// Picks `dir` when given, otherwise the default application directory.
pub fn resolve_application_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    dir.map_or_else(create_application_default_path, ensure_dir)
}
