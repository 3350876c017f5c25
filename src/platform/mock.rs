//! In-memory compositor for tests
//!
//! Keeps a mutable window list, applies move/resize/float/close directives
//! to it and records every call so tests can assert on the traffic.

use std::cell::RefCell;

use glam::IVec2;

use super::Compositor;
use super::types::{Client, CursorPos, Dispatch, Monitor, WorkspaceRef};
use crate::error::{Error, Result};
use crate::sim::{ArenaId, BodyId};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetAnimations,
    SetAnimations(bool),
    Dispatch(Dispatch),
    Batch(Vec<Dispatch>),
}

#[derive(Debug, Default)]
pub struct MockCompositor {
    pub monitors: RefCell<Vec<Monitor>>,
    pub clients: RefCell<Vec<Client>>,
    pub animations: RefCell<bool>,
    pub cursor: RefCell<CursorPos>,
    pub active: RefCell<Option<ArenaId>>,
    pub calls: RefCell<Vec<Call>>,
    /// Make `clients()` fail (transient outage)
    pub clients_offline: RefCell<bool>,
}

pub fn monitor(workspace: i64, width: u32, height: u32, x: i32) -> Monitor {
    Monitor {
        id: workspace,
        name: format!("DP-{workspace}"),
        width,
        height,
        scale: 1.0,
        transform: 0,
        x,
        y: 0,
        active_workspace: WorkspaceRef {
            id: workspace,
            name: workspace.to_string(),
        },
        focused: false,
    }
}

pub fn client(address: &str, workspace: i64, at: [i32; 2], size: [i32; 2], floating: bool) -> Client {
    Client {
        address: BodyId::new(address).to_string(),
        at,
        size,
        workspace: WorkspaceRef {
            id: workspace,
            name: workspace.to_string(),
        },
        floating,
        title: "DVD".into(),
        class: "kitty".into(),
        focus_history_id: None,
    }
}

impl MockCompositor {
    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self {
            monitors: RefCell::new(monitors),
            animations: RefCell::new(true),
            ..Default::default()
        }
    }

    pub fn add_client(&self, client: Client) {
        self.clients.borrow_mut().push(client);
    }

    pub fn remove_client(&self, id: &BodyId) {
        self.clients.borrow_mut().retain(|c| &c.body_id() != id);
    }

    pub fn client(&self, id: &BodyId) -> Option<Client> {
        self.clients.borrow().iter().find(|c| &c.body_id() == id).cloned()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.borrow_mut().drain(..).collect()
    }

    /// Every directive sent, batches flattened
    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.calls
            .borrow()
            .iter()
            .flat_map(|call| match call {
                Call::Dispatch(d) => vec![d.clone()],
                Call::Batch(ds) => ds.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn animation_writes(&self) -> Vec<bool> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::SetAnimations(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    fn apply(&self, dispatch: &Dispatch) {
        let mut clients = self.clients.borrow_mut();
        match dispatch {
            Dispatch::Close(id) => clients.retain(|c| &c.body_id() != id),
            Dispatch::MoveCursor(pos) => *self.cursor.borrow_mut() = CursorPos { x: pos.x, y: pos.y },
            Dispatch::Focus(_) => {}
            Dispatch::SetFloating(id) | Dispatch::SetTiled(id) | Dispatch::Resize { id, .. } | Dispatch::Move { id, .. } => {
                let Some(client) = clients.iter_mut().find(|c| &c.body_id() == id) else {
                    return;
                };
                match dispatch {
                    Dispatch::SetFloating(_) => client.floating = true,
                    Dispatch::SetTiled(_) => client.floating = false,
                    Dispatch::Resize { size, .. } => client.size = size.to_array(),
                    Dispatch::Move { pos, .. } => client.at = pos.to_array(),
                    _ => {}
                }
            }
        }
    }
}

impl Compositor for MockCompositor {
    fn monitors(&self) -> Result<Vec<Monitor>> {
        Ok(self.monitors.borrow().clone())
    }

    fn clients(&self) -> Result<Vec<Client>> {
        if *self.clients_offline.borrow() {
            return Err(Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)));
        }
        Ok(self.clients.borrow().clone())
    }

    fn animations_enabled(&self) -> Result<bool> {
        self.calls.borrow_mut().push(Call::GetAnimations);
        Ok(*self.animations.borrow())
    }

    fn set_animations(&self, enabled: bool) -> Result<()> {
        self.calls.borrow_mut().push(Call::SetAnimations(enabled));
        *self.animations.borrow_mut() = enabled;
        Ok(())
    }

    fn cursor_position(&self) -> Result<CursorPos> {
        Ok(*self.cursor.borrow())
    }

    fn active_workspace(&self) -> Result<ArenaId> {
        (*self.active.borrow()).ok_or_else(|| Error::Rejected {
            command: "activeworkspace".into(),
            reply: "none".into(),
        })
    }

    fn dispatch(&self, dispatch: &Dispatch) -> Result<()> {
        self.calls.borrow_mut().push(Call::Dispatch(dispatch.clone()));
        self.apply(dispatch);
        Ok(())
    }

    fn batch(&self, dispatches: &[Dispatch]) -> Result<()> {
        self.calls.borrow_mut().push(Call::Batch(dispatches.to_vec()));
        for dispatch in dispatches {
            self.apply(dispatch);
        }
        Ok(())
    }
}

pub fn moved_to(dispatches: &[Dispatch], id: &BodyId) -> Option<IVec2> {
    dispatches.iter().rev().find_map(|d| match d {
        Dispatch::Move { id: moved, pos } if moved == id => Some(*pos),
        _ => None,
    })
}
