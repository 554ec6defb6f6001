use anyhow::{anyhow, Result};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::instrument;
use xcb::{
    x::{self, Atom, GetProperty, InternAtom, Window, ATOM_ANY},
    Connection, Xid,
};

use super::{ActivitySource, ForegroundActivity};

fn intern(conn: &Connection, name: &[u8]) -> Result<Atom> {
    let reply = conn.wait_for_reply(conn.send_request(&InternAtom {
        only_if_exists: false,
        name,
    }))?;
    Ok(reply.atom())
}

fn property<T: x::PropEl + Copy>(
    conn: &Connection,
    window: Window,
    property: Atom,
    long_length: u32,
) -> Result<Vec<T>> {
    let reply = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window,
        property,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length,
    }))?;
    Ok(reply.value::<T>().to_vec())
}

/// Reads the foreground window through EWMH properties and resolves its process name.
pub struct X11ActivitySource {
    connection: Connection,
    root: Window,
    active_window_atom: Atom,
    window_name_atom: Atom,
    pid_atom: Atom,
    system: System,
}

impl X11ActivitySource {
    pub fn new() -> Result<Self> {
        let (connection, preferred_screen) = Connection::connect(None)?;
        let root = connection
            .get_setup()
            .roots()
            .nth(preferred_screen.max(0) as usize)
            .ok_or_else(|| anyhow!("Screen {preferred_screen} doesn't exist"))?
            .root();
        let active_window_atom = intern(&connection, b"_NET_ACTIVE_WINDOW")?;
        let window_name_atom = intern(&connection, b"_NET_WM_NAME")?;
        let pid_atom = intern(&connection, b"_NET_WM_PID")?;
        Ok(Self {
            connection,
            root,
            active_window_atom,
            window_name_atom,
            pid_atom,
            system: System::new(),
        })
    }

    fn process_name(&mut self, pid: u32) -> Option<String> {
        let pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        self.system
            .process(pid)
            .map(|process| process.name().to_string_lossy().to_string())
    }
}

impl ActivitySource for X11ActivitySource {
    #[instrument(skip(self))]
    fn sample(&mut self) -> Result<Option<ForegroundActivity>> {
        let Some(window) = property::<Window>(&self.connection, self.root, self.active_window_atom, 1)?
            .first()
            .copied()
            .filter(|window| !window.is_none())
        else {
            return Ok(None);
        };

        let title = property::<u8>(&self.connection, window, self.window_name_atom, 1024)?;
        let Some(pid) = property::<u32>(&self.connection, window, self.pid_atom, 1)?
            .first()
            .copied()
        else {
            return Ok(None);
        };

        Ok(self.process_name(pid).map(|app_name| ForegroundActivity {
            app_name: app_name.into(),
            window_title: String::from_utf8_lossy(&title).to_string().into(),
        }))
    }
}
