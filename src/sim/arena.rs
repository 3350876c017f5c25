//! Arena geometry
//!
//! An arena is one Hyprland workspace as laid out on the monitor currently
//! showing it. Positions inside the simulation are arena-local; Hyprland
//! speaks global layout coordinates, so the monitor origin converts between
//! the two.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{FALLBACK_ARENA_HEIGHT, FALLBACK_ARENA_WIDTH};
use crate::platform::Monitor;

/// Workspace id as reported by Hyprland (special workspaces are negative)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArenaId(pub i64);

impl std::fmt::Display for ArenaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded, scale-normalized coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub id: ArenaId,
    /// Logical size in pixels (rotation and scale applied)
    pub size: Vec2,
    /// Top-left of the hosting monitor in global coordinates
    pub origin: Vec2,
}

impl Arena {
    /// Degraded arena for a workspace no monitor is showing
    pub fn fallback(id: ArenaId) -> Self {
        Self {
            id,
            size: Vec2::new(FALLBACK_ARENA_WIDTH, FALLBACK_ARENA_HEIGHT),
            origin: Vec2::ZERO,
        }
    }

    /// Build the arena for `id` from the monitor list
    ///
    /// Falls back to [`Arena::fallback`] when the workspace is not active on
    /// any monitor (or the monitor reports a degenerate size).
    pub fn resolve(id: ArenaId, monitors: &[Monitor]) -> Self {
        monitors
            .iter()
            .find(|m| m.active_workspace.id == id.0)
            .and_then(|m| Self::from_monitor(id, m))
            .unwrap_or_else(|| {
                log::debug!("No monitor shows workspace {id}, using fallback arena size");
                Self::fallback(id)
            })
    }

    fn from_monitor(id: ArenaId, monitor: &Monitor) -> Option<Self> {
        let (mut w, mut h) = (monitor.width as f32, monitor.height as f32);
        if monitor.is_rotated() {
            std::mem::swap(&mut w, &mut h);
        }
        let scale = if monitor.scale > 0.0 { monitor.scale as f32 } else { 1.0 };
        let size = (Vec2::new(w, h) / scale).round();
        if size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        Some(Self {
            id,
            size,
            origin: Vec2::new(monitor.x as f32, monitor.y as f32),
        })
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Largest top-left coordinate that keeps a body of `body_size` inside
    #[inline]
    pub fn max_position(&self, body_size: Vec2) -> Vec2 {
        (self.size - body_size).max(Vec2::ZERO)
    }

    #[inline]
    pub fn to_global(&self, local: Vec2) -> Vec2 {
        local + self.origin
    }

    #[inline]
    pub fn to_local(&self, global: Vec2) -> Vec2 {
        global - self.origin
    }
}
