//! Hyprland request-socket client
//!
//! Each call opens `.socket.sock`, writes one command and reads the reply
//! until the compositor closes the connection. JSON queries use the `j/`
//! flag; several dispatches share one `[[BATCH]]` request.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::Compositor;
use super::types::{Client, CursorPos, Dispatch, Monitor, OptionValue, WorkspaceRef};
use crate::consts::IPC_TIMEOUT;
use crate::error::{Error, Result};
use crate::sim::ArenaId;

const SIGNATURE_VAR: &str = "HYPRLAND_INSTANCE_SIGNATURE";
const ANIMATIONS_OPTION: &str = "animations:enabled";

/// Directory holding the instance's sockets
///
/// `$XDG_RUNTIME_DIR/hypr/<signature>` on current Hyprland, `/tmp/hypr/<signature>`
/// on older releases.
pub fn socket_dir() -> Result<PathBuf> {
    let signature = std::env::var(SIGNATURE_VAR).map_err(|_| Error::NoInstance(SIGNATURE_VAR))?;
    if let Ok(runtime) = std::env::var("XDG_RUNTIME_DIR") {
        let dir = Path::new(&runtime).join("hypr").join(&signature);
        if dir.is_dir() {
            return Ok(dir);
        }
    }
    Ok(Path::new("/tmp/hypr").join(signature))
}

/// Control connection to a running Hyprland instance
#[derive(Debug, Clone)]
pub struct Hyprland {
    socket: PathBuf,
    /// Bound on each socket read and write
    timeout: Duration,
}

impl Hyprland {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
            timeout: IPC_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Locate the request socket of the session we run in
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(socket_dir()?.join(".socket.sock")))
    }

    /// Send one raw command and return the reply text
    pub fn request(&self, command: &str) -> Result<String> {
        let mut stream = UnixStream::connect(&self.socket)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(command.as_bytes())?;
        let mut reply = String::new();
        stream.read_to_string(&mut reply)?;
        log::trace!("{command} -> {} bytes", reply.len());
        Ok(reply)
    }

    fn query<T: DeserializeOwned>(&self, command: &str) -> Result<T> {
        let reply = self.request(&format!("j/{command}"))?;
        Ok(serde_json::from_str(&reply)?)
    }

    /// Send a command whose every reply chunk must be `ok`
    fn command(&self, command: &str) -> Result<()> {
        let reply = self.request(command)?;
        let rejected = reply
            .split("\n\n")
            .map(str::trim)
            .any(|chunk| !chunk.is_empty() && chunk != "ok");
        if rejected {
            return Err(Error::Rejected {
                command: command.to_string(),
                reply: reply.trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Compositor for Hyprland {
    fn monitors(&self) -> Result<Vec<Monitor>> {
        self.query("monitors")
    }

    fn clients(&self) -> Result<Vec<Client>> {
        self.query("clients")
    }

    fn animations_enabled(&self) -> Result<bool> {
        let value: OptionValue = self.query(&format!("getoption {ANIMATIONS_OPTION}"))?;
        Ok(value.as_bool())
    }

    fn set_animations(&self, enabled: bool) -> Result<()> {
        self.command(&format!("keyword {ANIMATIONS_OPTION} {}", u8::from(enabled)))
    }

    fn cursor_position(&self) -> Result<CursorPos> {
        self.query("cursorpos")
    }

    fn active_workspace(&self) -> Result<ArenaId> {
        let workspace: WorkspaceRef = self.query("activeworkspace")?;
        Ok(ArenaId(workspace.id))
    }

    fn dispatch(&self, dispatch: &Dispatch) -> Result<()> {
        self.command(&format!("dispatch {}", dispatch.to_command()))
    }

    fn batch(&self, dispatches: &[Dispatch]) -> Result<()> {
        if dispatches.is_empty() {
            return Ok(());
        }
        let commands: Vec<String> = dispatches
            .iter()
            .map(|d| format!("dispatch {}", d.to_command()))
            .collect();
        self.command(&format!("[[BATCH]]{}", commands.join(";")))
    }
}
