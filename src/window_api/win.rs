use anyhow::Result;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::instrument;
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId,
};

use super::{ActivitySource, ForegroundActivity};

/// Reads the foreground window and resolves the process owning it.
#[derive(Default)]
pub struct WindowsActivitySource;

impl ActivitySource for WindowsActivitySource {
    #[instrument(skip(self))]
    fn sample(&mut self) -> Result<Option<ForegroundActivity>> {
        let window = unsafe { GetForegroundWindow() };
        if window.is_invalid() {
            return Ok(None);
        }

        let mut id = 0u32;
        unsafe { GetWindowThreadProcessId(window, Some(&mut id)) };
        if id == 0 {
            return Ok(None);
        }

        let mut title = [0u16; 512];
        let length = unsafe { GetWindowTextW(window, &mut title) }.max(0) as usize;
        let window_title = String::from_utf16_lossy(&title[..length]);

        let pid = Pid::from_u32(id);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );

        Ok(system.process(pid).map(|process| ForegroundActivity {
            app_name: process.name().to_string_lossy().to_string().into(),
            window_title: window_title.into(),
        }))
    }
}
