//! hyprdvd - bouncing windows for Hyprland
//!
//! Core modules:
//! - `sim`: Simulation (bodies, placement, collisions, manager)
//! - `platform`: Compositor abstraction, Hyprland IPC and event socket
//! - `daemon`: Event-driven control loop for the normal mode
//! - `screensaver`: Snapshot/animate/restore session for the screensaver mode
//! - `settings`: Tunables, settings file and CLI overrides

pub mod daemon;
pub mod error;
pub mod platform;
pub mod screensaver;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::{ExitMode, Settings};

/// Simulation configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fraction of the arena a new body occupies when no size is requested
    pub const DEFAULT_RESIZE_RATIO: f32 = 0.15;
    /// Arena size used when no monitor currently shows the workspace
    pub const FALLBACK_ARENA_WIDTH: f32 = 1920.0;
    pub const FALLBACK_ARENA_HEIGHT: f32 = 1080.0;

    /// Speed of a body along each axis, in pixels per tick
    pub const BODY_SPEED: i32 = 2;

    /// Random samples tried before a placement is abandoned
    pub const PLACEMENT_ATTEMPTS: u32 = 100;

    /// Upper bound on pair-separation passes per tick
    pub const SEPARATION_PASSES: u32 = 16;

    /// Screensaver tiling: share of a grid cell a window may cover
    pub const CELL_FILL: f32 = 0.9;
    /// Screensaver tiling: jitter samples tried before falling back to the cell center
    pub const JITTER_ATTEMPTS: u32 = 50;

    /// Sleep between iterations of the event/tick loop
    pub const DAEMON_POLL_INTERVAL: Duration = Duration::from_millis(10);
    /// Read/write bound on one compositor request
    pub const IPC_TIMEOUT: Duration = Duration::from_secs(1);
    /// Sleep between screensaver ticks
    pub const SCREENSAVER_POLL_INTERVAL: Duration = Duration::from_millis(20);

    /// Title that marks a newly opened window as one to bounce
    pub const DEFAULT_TITLE_FILTER: &str = "DVD";
}
