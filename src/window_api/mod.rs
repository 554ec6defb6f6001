//! Contains logic for determining what the user is currently doing.
//! [GenericActivitySource] is the main artifact of this module that abstracts
//! the operations.

pub mod process_table;
#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::sync::Arc;

use anyhow::Result;
use process_table::ProcessTableSource;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ForegroundActivity {
    /// Name of the process. For example 'firefox' or 'Code.exe'
    pub app_name: Arc<str>,
    /// Title of the foreground window, empty when unknown. For example 'Vibing in YouTube -
    /// Chrome'
    pub window_title: Arc<str>,
}

/// Contract every way of sampling user activity must implement.
#[cfg_attr(test, mockall::automock)]
pub trait ActivitySource {
    /// Returns the current activity. `None` means nothing could be determined and is treated as
    /// idle time.
    fn sample(&mut self) -> Result<Option<ForegroundActivity>>;
}

/// Serves as a cross-platform [ActivitySource]. Uses foreground window detection when the
/// matching feature is enabled and falls back to the process table otherwise.
pub struct GenericActivitySource {
    inner: Box<dyn ActivitySource>,
}

impl GenericActivitySource {
    pub fn new(tracked_processes: Vec<String>) -> Self {
        Self {
            inner: platform_source(tracked_processes),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "win")] {
        fn platform_source(_tracked_processes: Vec<String>) -> Box<dyn ActivitySource> {
            Box::new(win::WindowsActivitySource)
        }
    } else if #[cfg(feature = "x11")] {
        fn platform_source(tracked_processes: Vec<String>) -> Box<dyn ActivitySource> {
            match x11::X11ActivitySource::new() {
                Ok(source) => Box::new(source),
                Err(e) => {
                    warn!("X11 is unavailable, falling back to the process table {e:?}");
                    Box::new(ProcessTableSource::new(tracked_processes))
                }
            }
        }
    } else {
        fn platform_source(tracked_processes: Vec<String>) -> Box<dyn ActivitySource> {
            if tracked_processes.is_empty() {
                warn!("No tracked processes configured, the busiest process will be recorded");
            }
            Box::new(ProcessTableSource::new(tracked_processes))
        }
    }
}

impl ActivitySource for GenericActivitySource {
    fn sample(&mut self) -> Result<Option<ForegroundActivity>> {
        self.inner.sample()
    }
}
