//! Settings and preferences
//!
//! Defaults, optionally overridden by a JSON settings file, then by CLI flags.
//! The file lives at `$XDG_CONFIG_HOME/hyprdvd/settings.json` unless a path is
//! given; every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{BODY_SPEED, DAEMON_POLL_INTERVAL, DEFAULT_TITLE_FILTER, SCREENSAVER_POLL_INTERVAL};
use crate::sim::{ArenaId, SizeRequest};

/// What ends a screensaver session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExitMode {
    /// The cursor moved away from where it was when the session started
    #[default]
    Pointer,
    /// SIGINT/SIGTERM only
    Signal,
}

impl ExitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitMode::Pointer => "pointer",
            ExitMode::Signal => "signal",
        }
    }

    /// Whether cursor displacement ends the session
    pub fn watches_pointer(&self) -> bool {
        matches!(self, ExitMode::Pointer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Pixels per tick per axis
    pub speed: i32,
    /// `WIDTHxHEIGHT`: ratios (<= 1) or pixels; unset uses the default ratio
    pub size: Option<String>,
    /// RNG seed; random per run when unset
    pub seed: Option<u64>,

    // === Daemon ===
    /// Only windows opened with this exact title bounce
    pub title: String,
    /// Sleep between loop iterations, in milliseconds
    pub poll_interval_ms: u64,

    // === Screensaver ===
    /// Workspaces to animate; empty means every visible one
    pub workspaces: Vec<i64>,
    pub exit_on: ExitMode,
    /// Sleep between screensaver ticks, in milliseconds
    pub screensaver_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: BODY_SPEED,
            size: None,
            seed: None,

            title: DEFAULT_TITLE_FILTER.to_string(),
            poll_interval_ms: DAEMON_POLL_INTERVAL.as_millis() as u64,

            workspaces: Vec::new(),
            exit_on: ExitMode::Pointer,
            screensaver_interval_ms: SCREENSAVER_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl Settings {
    /// `$XDG_CONFIG_HOME/hyprdvd/settings.json`, falling back to `~/.config`
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
        Some(base.join("hyprdvd").join("settings.json"))
    }

    /// Load from `path` (or the default location)
    ///
    /// A missing file gives the defaults silently; an unreadable or invalid
    /// one gives the defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Could not read {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn size_request(&self) -> SizeRequest {
        self.size.as_deref().map_or(SizeRequest::Default, |s| {
            s.parse().unwrap_or_default()
        })
    }

    pub fn target_workspaces(&self) -> Vec<ArenaId> {
        self.workspaces.iter().copied().map(ArenaId).collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn screensaver_interval(&self) -> Duration {
        Duration::from_millis(self.screensaver_interval_ms.max(1))
    }

    /// The configured seed, or a fresh random one
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }
}

/// Parse a comma-separated workspace list (`1,2,3`); unparsable entries are skipped
pub fn parse_workspaces(list: &str) -> Vec<i64> {
    list.split(',')
        .filter_map(|item| {
            let item = item.trim();
            let parsed = item.parse().ok();
            if parsed.is_none() && !item.is_empty() {
                log::warn!("Ignoring workspace {item:?}: not a numeric id");
            }
            parsed
        })
        .collect()
}
