//! Platform abstraction layer
//!
//! Everything the simulation needs from the compositor goes through the
//! [`Compositor`] trait, so the simulation never talks to a socket directly:
//! - `hyprland`: request-socket implementation
//! - `events`: event-socket transport and event parsing
//! - `types`: JSON wire types and dispatch directives

pub mod events;
pub mod hyprland;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use events::{Event, EventStream, LineBuffer};
pub use hyprland::Hyprland;
pub use types::{Client, CursorPos, Dispatch, Monitor, OptionValue, WorkspaceRef};

use crate::error::Result;
use crate::sim::ArenaId;

/// Control command interface of the window manager
///
/// Methods take `&self`: a call is one request/response exchange.
pub trait Compositor {
    /// Display topology
    fn monitors(&self) -> Result<Vec<Monitor>>;
    /// All mapped client windows
    fn clients(&self) -> Result<Vec<Client>>;
    /// Current value of `animations:enabled`
    fn animations_enabled(&self) -> Result<bool>;
    fn set_animations(&self, enabled: bool) -> Result<()>;
    fn cursor_position(&self) -> Result<CursorPos>;
    fn active_workspace(&self) -> Result<ArenaId>;
    fn dispatch(&self, dispatch: &Dispatch) -> Result<()>;
    /// Several directives in one request
    fn batch(&self, dispatches: &[Dispatch]) -> Result<()>;
}

/// Run a directive, logging instead of propagating a failure
///
/// One misbehaving window must not stop the others from being animated.
pub fn dispatch_logged(wm: &impl Compositor, dispatch: &Dispatch) -> bool {
    match wm.dispatch(dispatch) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("`{}` failed: {e}", dispatch.to_command());
            false
        }
    }
}
