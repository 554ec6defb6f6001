use std::{
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{anyhow, Result};
use sysinfo::{get_current_pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind};
use tracing::info;

/// Stops every other process running the executable at `name`. Returns how many were stopped.
pub fn kill_previous_servers(name: &Path) -> Result<usize> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_exe(UpdateKind::Always),
    );
    let current_id = get_current_pid().map_err(|e| anyhow!("Can't get own pid {e}"))?;

    let mut stopped = 0;
    for (pid, process) in system.processes() {
        if *pid == current_id || process.thread_kind().is_some() {
            continue;
        }
        if matches!(process.parent(), Some(p) if p == current_id) {
            continue;
        }

        if process.exe().is_some_and(|exe| exe == name) {
            info!("Stopping tracker {pid}");
            // Trackers save their data on SIGTERM. Platforms without it get a hard kill.
            if process.kill_with(Signal::Term).is_none() {
                process.kill();
            }
            process.wait();
            stopped += 1;
        }
    }
    Ok(stopped)
}

/// Stops previous trackers and starts a new one detached from the console.
pub fn restart_server(dir: &Path) -> Result<()> {
    let process_name = std::env::current_exe()?;
    kill_previous_servers(&process_name)?;

    let mut command = Command::new(process_name);
    command.arg("--dir").arg(dir).arg("serve");

    #[cfg(feature = "win")]
    {
        use std::os::windows::process::CommandExt;
        use windows::Win32::System::Threading::DETACHED_PROCESS;
        command.creation_flags(DETACHED_PROCESS.0);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    #[allow(clippy::zombie_processes)]
    let child = command.spawn()?;
    println!("Started tracking in the background (pid {})", child.id());
    Ok(())
}
