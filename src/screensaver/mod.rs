//! Screensaver mode
//!
//! Takes every window on the target workspaces, tiles them into a grid,
//! bounces them until the user comes back, then puts everything where it was.
//!
//! Restoration lives in [`Session`]'s `Drop`, so it also runs when the loop
//! bails out early.

pub mod layout;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glam::IVec2;

use crate::error::Result;
use crate::platform::{Client, Compositor, CursorPos, Dispatch, dispatch_logged};
use crate::settings::{ExitMode, Settings};
use crate::sim::manager::monitors_or_empty;
use crate::sim::{Arena, ArenaId, Body, BodyId, Simulation, SizeRequest, random_velocity};

pub use layout::{Grid, layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Armed,
    Running,
    Restoring,
    Done,
}

/// Where a window was before the session took it
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWindow {
    pub id: BodyId,
    pub arena: ArenaId,
    /// Global position
    pub at: IVec2,
    pub size: IVec2,
    pub floating: bool,
}

impl SavedWindow {
    fn from_client(client: &Client) -> Self {
        Self {
            id: client.body_id(),
            arena: client.arena_id(),
            at: IVec2::from_array(client.at),
            size: IVec2::from_array(client.size),
            floating: client.floating,
        }
    }

    pub fn area(&self) -> i64 {
        self.size.x as i64 * self.size.y as i64
    }
}

/// Decides when the running loop ends
pub struct ExitTrigger {
    mode: ExitMode,
    stop: Arc<AtomicBool>,
}

impl ExitTrigger {
    pub fn new(mode: ExitMode, stop: Arc<AtomicBool>) -> Self {
        Self { mode, stop }
    }

    /// Signal flag in every mode, cursor displacement in pointer mode
    pub fn fired(&self, wm: &impl Compositor, baseline: Option<CursorPos>) -> bool {
        if self.stop.load(Ordering::SeqCst) {
            log::info!("Stop signal received");
            return true;
        }
        if !self.mode.watches_pointer() {
            return false;
        }
        match (baseline, wm.cursor_position()) {
            (Some(baseline), Ok(now)) if now != baseline => {
                log::info!("Pointer moved to ({}, {})", now.x, now.y);
                true
            }
            (_, Err(e)) => {
                log::debug!("Cursor query failed: {e}");
                false
            }
            _ => false,
        }
    }
}

pub struct Session<'a, C: Compositor> {
    wm: &'a C,
    sim: Simulation,
    saved: Vec<SavedWindow>,
    baseline: Option<CursorPos>,
    phase: Phase,
}

impl<'a, C: Compositor> Session<'a, C> {
    /// Capture the cursor and snapshot every window on the target workspaces
    pub fn arm(wm: &'a C, workspaces: &[ArenaId], sim: Simulation) -> Result<Self> {
        let baseline = match wm.cursor_position() {
            Ok(pos) => Some(pos),
            Err(e) => {
                log::warn!("Could not read the cursor position, pointer exit disabled: {e}");
                None
            }
        };

        let clients = wm.clients()?;
        let targets = target_arenas(wm, &clients, workspaces);
        log::info!("Screensaver armed on workspace(s) {targets:?}");

        let saved = clients
            .iter()
            .filter(|c| targets.contains(&c.arena_id()))
            .filter(|c| c.size[0] > 0 && c.size[1] > 0)
            .map(SavedWindow::from_client)
            .collect();

        Ok(Self {
            wm,
            sim,
            saved,
            baseline,
            phase: Phase::Armed,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn saved(&self) -> &[SavedWindow] {
        &self.saved
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Tile the snapshot into a grid per workspace and start bouncing it
    ///
    /// `max` caps the window size; returns how many windows were adopted.
    pub fn stage(&mut self, max: Option<SizeRequest>) -> usize {
        let mut by_arena: BTreeMap<ArenaId, Vec<BodyId>> = BTreeMap::new();
        for window in &self.saved {
            by_arena.entry(window.arena).or_default().push(window.id.clone());
        }
        let monitors = monitors_or_empty(self.wm);

        let mut adopted = 0;
        for (arena_id, ids) in by_arena {
            let arena = Arena::resolve(arena_id, &monitors);
            let cap = max.as_ref().map(|m| m.resolve(&arena));
            let rects = layout(ids.len(), &arena, cap, self.sim.rng());
            log::debug!("Workspace {arena_id}: {} window(s), {}x{} arena", ids.len(), arena.width(), arena.height());

            for (id, rect) in ids.into_iter().zip(rects) {
                let speed = self.sim.speed();
                let vel = random_velocity(self.sim.rng(), speed);
                let body = Body::new(id, arena, rect.pos, rect.size, vel);
                dispatch_logged(self.wm, &Dispatch::SetFloating(body.id.clone()));
                dispatch_logged(self.wm, &Dispatch::resize(&body.id, rect.size));
                dispatch_logged(self.wm, &Dispatch::move_to(&body.id, body.global_position()));
                if self.sim.adopt_body(self.wm, body) {
                    adopted += 1;
                }
            }
        }
        adopted
    }

    /// Bounce until the trigger fires or every window is gone; returns ticks run
    pub fn run(&mut self, trigger: &ExitTrigger, interval: Duration) -> u64 {
        self.phase = Phase::Running;
        log::info!("Screensaver running with {} window(s)", self.sim.len());
        let mut ticks = 0;
        loop {
            if trigger.fired(self.wm, self.baseline) {
                break;
            }
            if self.sim.tick(self.wm) == 0 {
                log::info!("Every window is gone");
                break;
            }
            ticks += 1;
            std::thread::sleep(interval);
        }
        ticks
    }

    /// Put every window back; does nothing after the first call
    pub fn restore(&mut self) {
        if matches!(self.phase, Phase::Restoring | Phase::Done) {
            return;
        }
        self.phase = Phase::Restoring;
        log::info!("Restoring {} window(s)", self.saved.len());

        for window in &self.saved {
            dispatch_logged(self.wm, &Dispatch::resize(&window.id, window.size.as_vec2()));
            dispatch_logged(self.wm, &Dispatch::move_to(&window.id, window.at));
        }
        self.sim.shutdown(self.wm);

        // Re-tiling largest first approximates the original layout
        let mut tiled: Vec<&SavedWindow> = self.saved.iter().filter(|w| !w.floating).collect();
        tiled.sort_by(|a, b| b.area().cmp(&a.area()));
        let retile: Vec<Dispatch> = tiled
            .iter()
            .flat_map(|w| [Dispatch::Focus(w.id.clone()), Dispatch::SetTiled(w.id.clone())])
            .collect();
        if !retile.is_empty() {
            if let Err(e) = self.wm.batch(&retile) {
                log::warn!("Re-tiling {} window(s) failed: {e}", tiled.len());
            }
        }

        if let Some(baseline) = self.baseline {
            dispatch_logged(self.wm, &Dispatch::MoveCursor(IVec2::new(baseline.x, baseline.y)));
        }
        self.phase = Phase::Done;
        log::info!("Screensaver done");
    }
}

impl<C: Compositor> Drop for Session<'_, C> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Explicit list, else every monitor's visible workspace, else the active one
pub fn target_arenas(wm: &impl Compositor, clients: &[Client], explicit: &[ArenaId]) -> Vec<ArenaId> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    let mut visible: Vec<ArenaId> = monitors_or_empty(wm)
        .iter()
        .map(|m| ArenaId(m.active_workspace.id))
        .collect();
    visible.sort();
    visible.dedup();
    if !visible.is_empty() {
        return visible;
    }

    if let Some(focused) = clients.iter().find(|c| c.is_focused()) {
        return vec![focused.arena_id()];
    }
    match wm.active_workspace() {
        Ok(arena) => vec![arena],
        Err(e) => {
            log::warn!("No workspace to animate: {e}");
            Vec::new()
        }
    }
}

/// Full screensaver session: arm, stage, run, restore
pub fn run(wm: &impl Compositor, settings: &Settings, stop: Arc<AtomicBool>) -> Result<()> {
    let sim = Simulation::new(settings.resolved_seed(), settings.size_request()).with_speed(settings.speed);
    let mut session = Session::arm(wm, &settings.target_workspaces(), sim)?;

    let max = settings.size.is_some().then(|| settings.size_request());
    if session.stage(max) == 0 {
        log::info!("No windows to animate");
        return Ok(());
    }

    let trigger = ExitTrigger::new(settings.exit_on, stop);
    session.run(&trigger, settings.screensaver_interval());
    session.restore();
    Ok(())
}
