//! Animation suppression
//!
//! Hyprland eases every window move, which fights the per-tick moves of the
//! simulation. While any workspace has bouncing windows, `animations:enabled`
//! is forced off. The value observed before the first workspace engaged is
//! written back once, when the last one releases.

use std::collections::BTreeSet;

use super::arena::ArenaId;
use crate::error::Result;
use crate::platform::Compositor;

#[derive(Debug, Default)]
pub struct Suppression {
    /// Workspaces that currently hold bouncing windows
    engaged: BTreeSet<ArenaId>,
    /// `animations:enabled` as it was before we touched it
    original: Option<bool>,
    /// Whether the compositor currently has our forced-off value
    forced: bool,
}

impl Suppression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self, arena: ArenaId) -> bool {
        self.engaged.contains(&arena)
    }

    pub fn engaged(&self) -> Vec<ArenaId> {
        self.engaged.iter().copied().collect()
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn original(&self) -> Option<bool> {
        self.original
    }

    /// Engage `arena`, forcing animations off if they are not already
    ///
    /// Capturing the original value happens only for the first engagement,
    /// so later arenas never capture our own forced-off value.
    pub fn engage(&mut self, wm: &impl Compositor, arena: ArenaId) -> Result<()> {
        if self.engaged.insert(arena) {
            log::debug!("Animation suppression engaged on workspace {arena}");
        }
        if self.forced {
            return Ok(());
        }
        if self.original.is_none() {
            self.original = Some(wm.animations_enabled()?);
        }
        wm.set_animations(false)?;
        self.forced = true;
        Ok(())
    }

    /// Release `arena`; the last release restores the original value
    pub fn release(&mut self, wm: &impl Compositor, arena: ArenaId) -> Result<()> {
        if !self.engaged.remove(&arena) {
            return Ok(());
        }
        log::debug!("Animation suppression released on workspace {arena}");
        if self.engaged.is_empty() {
            self.restore(wm)?;
        }
        Ok(())
    }

    /// Temporarily hand the original value back while arenas stay engaged
    ///
    /// The next [`engage`](Self::engage) forces animations off again.
    pub fn relax(&mut self, wm: &impl Compositor) -> Result<()> {
        if let (true, Some(original)) = (self.forced, self.original) {
            wm.set_animations(original)?;
            self.forced = false;
        }
        Ok(())
    }

    /// Release every engaged arena
    pub fn release_all(&mut self, wm: &impl Compositor) -> Result<()> {
        self.engaged.clear();
        self.restore(wm)
    }

    fn restore(&mut self, wm: &impl Compositor) -> Result<()> {
        if let Some(original) = self.original {
            if self.forced {
                wm.set_animations(original)?;
                log::debug!("Restored animations:enabled = {original}");
            }
        }
        self.original = None;
        self.forced = false;
        Ok(())
    }
}
