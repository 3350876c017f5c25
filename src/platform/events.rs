//! Event socket transport
//!
//! Hyprland streams `event>>field,field,...` lines on `.socket2.sock`. The
//! stream is read non-blockingly; partial lines are kept until their newline
//! arrives.

use std::io::{ErrorKind, Read};
use std::os::unix::net::UnixStream;

use crate::error::Result;
use crate::sim::{ArenaId, BodyId};

/// Events the simulation reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `openwindow>>ADDRESS,WORKSPACE,CLASS,TITLE`
    WindowOpened {
        id: BodyId,
        /// Parsed workspace name; `None` for named workspaces
        workspace: Option<ArenaId>,
        class: String,
        title: String,
    },
    /// `workspace>>NAME` or `workspacev2>>ID,NAME`
    WorkspaceFocused(ArenaId),
    /// `activewindowv2>>ADDRESS`
    WindowFocused(BodyId),
}

impl Event {
    /// Parse one line; unknown or malformed records yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let (kind, payload) = line.trim().split_once(">>")?;
        match kind {
            "openwindow" => {
                // Titles may contain commas: only split off the first three fields
                let mut fields = payload.splitn(4, ',');
                let address = fields.next().filter(|a| !a.is_empty())?;
                let workspace = fields.next()?;
                let class = fields.next()?;
                let title = fields.next().unwrap_or_default();
                Some(Self::WindowOpened {
                    id: BodyId::new(address),
                    workspace: workspace.trim().parse().ok().map(ArenaId),
                    class: class.to_string(),
                    title: title.to_string(),
                })
            }
            "workspace" => payload.trim().parse().ok().map(|id| Self::WorkspaceFocused(ArenaId(id))),
            "workspacev2" => {
                let id = payload.split(',').next()?;
                id.trim().parse().ok().map(|id| Self::WorkspaceFocused(ArenaId(id)))
            }
            "activewindowv2" => {
                let address = payload.trim();
                (!address.is_empty()).then(|| Self::WindowFocused(BodyId::new(address)))
            }
            _ => None,
        }
    }
}

/// Accumulates raw bytes and hands out complete lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete line without its terminator; blank lines are skipped
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let newline = self.pending.iter().position(|&b| b == b'\n')?;
            let raw: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
    }

    /// Bytes waiting for their newline
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// What one non-blocking poll produced
#[derive(Debug, Default)]
pub struct Poll {
    pub lines: Vec<String>,
    /// The compositor closed the event socket
    pub closed: bool,
}

/// Non-blocking reader over the event socket
pub struct EventStream<R = UnixStream> {
    reader: R,
    buffer: LineBuffer,
}

impl EventStream<UnixStream> {
    /// Connect to `.socket2.sock` of the current session
    pub fn connect() -> Result<Self> {
        let path = super::hyprland::socket_dir()?.join(".socket2.sock");
        let stream = UnixStream::connect(&path)?;
        stream.set_nonblocking(true)?;
        log::info!("Listening for events on {}", path.display());
        Ok(Self::new(stream))
    }
}

impl<R: Read> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: LineBuffer::new(),
        }
    }

    /// Drain everything readable right now without blocking
    pub fn poll(&mut self) -> Result<Poll> {
        let mut poll = Poll::default();
        let mut chunk = [0u8; 4096];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    poll.closed = true;
                    break;
                }
                Ok(n) => self.buffer.push(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        while let Some(line) = self.buffer.next_line() {
            poll.lines.push(line);
        }
        Ok(poll)
    }
}
