use anyhow::Result;
use sysinfo::{get_current_pid, Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::{instrument, trace};

use super::{ActivitySource, ForegroundActivity};

/// Samples activity from the OS process table. With configured names the first running one is
/// reported, otherwise the process using the most CPU since the previous sample.
pub struct ProcessTableSource {
    system: System,
    tracked: Vec<String>,
    own_pid: Option<Pid>,
}

impl ProcessTableSource {
    pub fn new(tracked: Vec<String>) -> Self {
        Self {
            system: System::new(),
            tracked: tracked.into_iter().map(|v| v.to_lowercase()).collect(),
            own_pid: get_current_pid().ok(),
        }
    }
}

impl ActivitySource for ProcessTableSource {
    #[instrument(skip(self))]
    fn sample(&mut self) -> Result<Option<ForegroundActivity>> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );

        let candidates = self
            .system
            .processes()
            .iter()
            .filter(|(pid, process)| Some(**pid) != self.own_pid && process.thread_kind().is_none())
            .map(|(_, process)| {
                (
                    process.name().to_string_lossy().to_string(),
                    process.cpu_usage(),
                )
            });

        let picked = pick_activity(candidates, &self.tracked);
        trace!("Picked {picked:?}");
        Ok(picked.map(|app_name| ForegroundActivity {
            app_name: app_name.into(),
            window_title: "".into(),
        }))
    }
}

/// Chooses the reported process among `(name, cpu usage)` pairs. `tracked` must be lowercase
/// and is searched in order.
pub fn pick_activity(
    candidates: impl IntoIterator<Item = (String, f32)>,
    tracked: &[String],
) -> Option<String> {
    let candidates = candidates.into_iter().collect::<Vec<_>>();

    if !tracked.is_empty() {
        return tracked.iter().find_map(|wanted| {
            candidates
                .iter()
                .find(|(name, _)| name.to_lowercase() == *wanted)
                .map(|(name, _)| name.clone())
        });
    }

    candidates
        .into_iter()
        .filter(|(_, cpu)| *cpu > 0.)
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(name, _)| name)
}
