//! Simulation manager
//!
//! Owns the bouncing windows and the animation suppression state. Every
//! tick: reconcile against Hyprland's client list, step the physics, then
//! send one batched move command.

use std::collections::{BTreeSet, HashMap};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::arena::{Arena, ArenaId};
use super::body::{Body, BodyId, SizeRequest, random_velocity};
use super::placement::place;
use super::suppression::Suppression;
use super::tick::step;
use crate::consts::BODY_SPEED;
use crate::error::Result;
use crate::platform::{Client, Compositor, Dispatch, Monitor, dispatch_logged};

/// Outcome of [`Simulation::add_body`]
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn {
    /// Registered at this arena-local position
    Placed(Vec2),
    /// No free spot; the window was closed
    Closed,
    /// Already bouncing
    AlreadyTracked,
    /// Hyprland no longer knows the window
    Vanished,
}

pub struct Simulation {
    /// Live bodies, in insertion order
    bodies: Vec<Body>,
    suppression: Suppression,
    rng: Pcg32,
    /// Pixels per tick per axis
    speed: i32,
    /// Size given to windows added through `add_body`
    size: SizeRequest,
    /// Ticks run so far
    pub time_ticks: u64,
}

impl Simulation {
    pub fn new(seed: u64, size: SizeRequest) -> Self {
        Self {
            bodies: Vec::new(),
            suppression: Suppression::new(),
            rng: Pcg32::seed_from_u64(seed),
            speed: BODY_SPEED,
            size,
            time_ticks: 0,
        }
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed.max(1);
        self
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: &BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BodyId) -> bool {
        self.body(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Number of bodies bouncing in `arena`
    pub fn bodies_in(&self, arena: ArenaId) -> usize {
        self.bodies.iter().filter(|b| b.arena_id() == arena).count()
    }

    pub fn suppression(&self) -> &Suppression {
        &self.suppression
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Start bouncing a freshly opened window
    ///
    /// `workspace` comes from the open event; when it is a named workspace
    /// the id is looked up from the client list.
    pub fn add_body(&mut self, wm: &impl Compositor, id: BodyId, workspace: Option<ArenaId>) -> Result<Spawn> {
        if self.contains(&id) {
            return Ok(Spawn::AlreadyTracked);
        }
        let arena_id = match workspace {
            Some(arena) => arena,
            None => match wm.clients()?.iter().find(|c| c.body_id() == id) {
                Some(client) => client.arena_id(),
                None => return Ok(Spawn::Vanished),
            },
        };

        let arena = Arena::resolve(arena_id, &monitors_or_empty(wm));
        let size = self.size.resolve(&arena);

        let pos = match place(size, &arena, &self.bodies, &mut self.rng) {
            Ok(pos) => pos,
            Err(e) => {
                log::warn!("Closing {id} on workspace {arena_id}: {e}");
                dispatch_logged(wm, &Dispatch::Close(id));
                return Ok(Spawn::Closed);
            }
        };

        let vel = random_velocity(&mut self.rng, self.speed);
        let body = Body::new(id, arena, pos, size, vel);
        dispatch_logged(wm, &Dispatch::SetFloating(body.id.clone()));
        dispatch_logged(wm, &Dispatch::resize(&body.id, size));
        dispatch_logged(wm, &Dispatch::move_to(&body.id, body.global_position()));
        log::info!(
            "Bouncing {} on workspace {arena_id}: {}x{} at ({}, {})",
            body.id,
            size.x,
            size.y,
            pos.x,
            pos.y
        );

        self.bodies.push(body);
        self.engage(wm, arena_id);
        Ok(Spawn::Placed(pos))
    }

    /// Register a body that is already sized and placed
    ///
    /// Used by the screensaver, which positions windows itself; the body is
    /// trusted as synced and no placement or re-query happens.
    pub fn adopt_body(&mut self, wm: &impl Compositor, mut body: Body) -> bool {
        if self.contains(&body.id) {
            return false;
        }
        body.position_synced = true;
        let arena = body.arena_id();
        self.bodies.push(body);
        self.engage(wm, arena);
        true
    }

    /// Sync with Hyprland's client list; returns the bodies that disappeared
    ///
    /// A failed query skips the pass: the bodies are simulated unchanged and
    /// the next tick retries.
    pub fn reconcile(&mut self, wm: &impl Compositor) -> Vec<BodyId> {
        let clients = match wm.clients() {
            Ok(clients) => clients,
            Err(e) => {
                log::warn!("Skipping reconciliation: {e}");
                return Vec::new();
            }
        };
        let by_id: HashMap<BodyId, &Client> = clients.iter().map(|c| (c.body_id(), c)).collect();

        let needs_topology = self
            .bodies
            .iter()
            .any(|b| by_id.get(&b.id).is_some_and(|c| c.arena_id() != b.arena_id()));
        let monitors = if needs_topology { monitors_or_empty(wm) } else { Vec::new() };

        let mut removed = Vec::new();
        let mut left: BTreeSet<ArenaId> = BTreeSet::new();
        let mut entered: BTreeSet<ArenaId> = BTreeSet::new();

        self.bodies.retain_mut(|body| {
            let Some(client) = by_id.get(&body.id) else {
                log::info!("{} is gone, no longer bouncing it", body.id);
                removed.push(body.id.clone());
                left.insert(body.arena_id());
                return false;
            };

            if client.arena_id() != body.arena_id() {
                log::info!("{} moved from workspace {} to {}", body.id, body.arena_id(), client.arena_id());
                left.insert(body.arena_id());
                entered.insert(client.arena_id());
                body.arena = Arena::resolve(client.arena_id(), &monitors);
                body.position_synced = false;
            }

            if !body.position_synced {
                body.pos = body.arena.to_local(client.position());
                body.position_synced = true;
            }
            let size = client.size_vec();
            if size.x > 0.0 && size.y > 0.0 {
                body.size = size;
            }
            true
        });

        for arena in entered {
            self.engage(wm, arena);
        }
        for arena in left {
            if self.bodies_in(arena) == 0 {
                self.release(wm, arena);
            }
        }
        removed
    }

    /// One full simulation tick; returns the number of live bodies
    pub fn tick(&mut self, wm: &impl Compositor) -> usize {
        self.reconcile(wm);
        if self.bodies.is_empty() {
            return 0;
        }

        step(&mut self.bodies);
        self.time_ticks += 1;

        let moves: Vec<Dispatch> = self
            .bodies
            .iter()
            .map(|b| Dispatch::move_to(&b.id, b.global_position()))
            .collect();
        if let Err(e) = wm.batch(&moves) {
            log::warn!("Batched move of {} window(s) failed: {e}", moves.len());
        }
        self.bodies.len()
    }

    /// The user switched to `arena`
    pub fn on_arena_focus_change(&mut self, wm: &impl Compositor, arena: ArenaId) {
        if self.bodies_in(arena) > 0 {
            self.engage(wm, arena);
        } else {
            self.release(wm, arena);
            if let Err(e) = self.suppression.relax(wm) {
                log::warn!("Could not restore animations on workspace {arena}: {e}");
            }
        }

        for engaged in self.suppression.engaged() {
            if self.bodies_in(engaged) == 0 {
                self.release(wm, engaged);
            }
        }
    }

    /// Keyboard focus moved to the window `id`
    pub fn on_entity_focus_change(&mut self, wm: &impl Compositor, id: &BodyId) {
        if let Some(arena) = self.body(id).map(Body::arena_id) {
            self.engage(wm, arena);
            return;
        }
        let arena = match wm.clients() {
            Ok(clients) => clients.iter().find(|c| &c.body_id() == id).map(Client::arena_id),
            Err(e) => {
                log::debug!("Ignoring focus change to {id}: {e}");
                return;
            }
        };
        if let Some(arena) = arena.filter(|a| self.bodies_in(*a) == 0) {
            self.release(wm, arena);
            if let Err(e) = self.suppression.relax(wm) {
                log::warn!("Could not restore animations: {e}");
            }
        }
    }

    /// Drop every body and hand animations back
    pub fn shutdown(&mut self, wm: &impl Compositor) {
        self.bodies.clear();
        if let Err(e) = self.suppression.release_all(wm) {
            log::warn!("Could not restore animations: {e}");
        }
    }

    fn engage(&mut self, wm: &impl Compositor, arena: ArenaId) {
        if let Err(e) = self.suppression.engage(wm, arena) {
            log::warn!("Could not disable animations for workspace {arena}: {e}");
        }
    }

    fn release(&mut self, wm: &impl Compositor, arena: ArenaId) {
        if let Err(e) = self.suppression.release(wm, arena) {
            log::warn!("Could not restore animations for workspace {arena}: {e}");
        }
    }
}

/// Monitor list, or nothing (every arena then falls back to default geometry)
pub fn monitors_or_empty(wm: &impl Compositor) -> Vec<Monitor> {
    wm.monitors().unwrap_or_else(|e| {
        log::warn!("Could not query monitors: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockCompositor, client, monitor, moved_to};
    use crate::sim::collision::{any_overlap, in_bounds};
    use glam::IVec2;

    fn setup() -> MockCompositor {
        MockCompositor::new(vec![monitor(1, 1000, 800, 0), monitor(2, 1920, 1080, 1000)])
    }

    fn open(wm: &MockCompositor, sim: &mut Simulation, name: &str, ws: i64) -> Spawn {
        wm.add_client(client(name, ws, [0, 0], [500, 500], false));
        sim.add_body(wm, BodyId::new(name), Some(ArenaId(ws))).unwrap()
    }

    #[test]
    fn test_add_body_places_and_suppresses() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Ratio(0.4, 0.4));
        let Spawn::Placed(pos) = open(&wm, &mut sim, "a", 1) else {
            panic!("expected placement");
        };

        let body = &sim.bodies()[0];
        assert_eq!(body.size, Vec2::new(400.0, 320.0));
        assert_eq!(body.vel.abs(), IVec2::splat(2));
        assert!(!body.position_synced);

        let c = wm.client(&BodyId::new("a")).unwrap();
        assert!(c.floating);
        assert_eq!(c.size, [400, 320]);
        assert_eq!(c.at, pos.as_ivec2().to_array());
        assert!(!*wm.animations.borrow());
        assert!(sim.suppression().is_engaged(ArenaId(1)));
    }

    #[test]
    fn test_add_body_uses_global_coordinates() {
        let wm = setup();
        let mut sim = Simulation::new(5, SizeRequest::Default);
        let Spawn::Placed(pos) = open(&wm, &mut sim, "b", 2) else {
            panic!("expected placement");
        };
        let moved = moved_to(&wm.dispatches(), &BodyId::new("b")).unwrap();
        assert_eq!(moved, IVec2::new(pos.x as i32 + 1000, pos.y as i32));
    }

    #[test]
    fn test_add_body_closes_when_full() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Ratio(1.0, 1.0));
        assert!(matches!(open(&wm, &mut sim, "a", 1), Spawn::Placed(_)));
        assert_eq!(open(&wm, &mut sim, "b", 1), Spawn::Closed);
        assert_eq!(sim.len(), 1);
        assert!(wm.client(&BodyId::new("b")).is_none());
        assert!(wm.dispatches().contains(&Dispatch::Close(BodyId::new("b"))));
    }

    #[test]
    fn test_add_body_twice_is_ignored() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);
        assert_eq!(sim.add_body(&wm, BodyId::new("a"), Some(ArenaId(1))).unwrap(), Spawn::AlreadyTracked);
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn test_add_body_named_workspace_lookup() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        wm.add_client(client("n", 2, [0, 0], [100, 100], false));
        assert!(matches!(sim.add_body(&wm, BodyId::new("n"), None).unwrap(), Spawn::Placed(_)));
        assert_eq!(sim.bodies()[0].arena_id(), ArenaId(2));
        assert_eq!(sim.add_body(&wm, BodyId::new("ghost"), None).unwrap(), Spawn::Vanished);
    }

    #[test]
    fn test_first_reconcile_adopts_position_then_simulation_owns_it() {
        let wm = setup();
        let mut sim = Simulation::new(3, SizeRequest::Default);
        open(&wm, &mut sim, "a", 2);
        let id = BodyId::new("a");

        // The compositor put the window somewhere else than asked
        wm.clients.borrow_mut()[0].at = [1100, 200];
        sim.reconcile(&wm);
        let body = sim.body(&id).unwrap();
        assert!(body.position_synced);
        assert_eq!(body.pos, Vec2::new(100.0, 200.0));

        // Later external moves are ignored, resizes are not
        wm.clients.borrow_mut()[0].at = [1500, 500];
        wm.clients.borrow_mut()[0].size = [300, 250];
        sim.reconcile(&wm);
        let body = sim.body(&id).unwrap();
        assert_eq!(body.pos, Vec2::new(100.0, 200.0));
        assert_eq!(body.size, Vec2::new(300.0, 250.0));
    }

    #[test]
    fn test_reconcile_removes_vanished_and_releases() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);
        open(&wm, &mut sim, "b", 1);
        open(&wm, &mut sim, "c", 2);

        wm.remove_client(&BodyId::new("a"));
        assert_eq!(sim.reconcile(&wm), vec![BodyId::new("a")]);
        assert!(sim.suppression().is_engaged(ArenaId(1)));

        wm.remove_client(&BodyId::new("b"));
        wm.remove_client(&BodyId::new("c"));
        sim.reconcile(&wm);
        assert!(sim.is_empty());
        assert!(sim.suppression().engaged().is_empty());
        assert_eq!(wm.animation_writes(), vec![false, true]);
    }

    #[test]
    fn test_reconcile_reassociates_moved_window() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);
        sim.reconcile(&wm);

        {
            let mut clients = wm.clients.borrow_mut();
            clients[0].workspace.id = 2;
            clients[0].at = [1010, 20];
        }
        sim.reconcile(&wm);
        let body = &sim.bodies()[0];
        assert_eq!(body.arena_id(), ArenaId(2));
        assert_eq!(body.arena.size, Vec2::new(1920.0, 1080.0));
        assert_eq!(body.pos, Vec2::new(10.0, 20.0));
        assert_eq!(sim.suppression().engaged(), vec![ArenaId(2)]);
        assert!(!*wm.animations.borrow());
    }

    #[test]
    fn test_reconcile_survives_query_failure() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);
        *wm.clients_offline.borrow_mut() = true;
        assert!(sim.reconcile(&wm).is_empty());
        assert_eq!(sim.tick(&wm), 1);
    }

    #[test]
    fn test_tick_batches_one_move_per_body() {
        let wm = setup();
        let mut sim = Simulation::new(9, SizeRequest::Ratio(0.1, 0.1));
        for name in ["a", "b", "c"] {
            open(&wm, &mut sim, name, 1);
        }
        wm.take_calls();

        assert_eq!(sim.tick(&wm), 3);
        let calls = wm.take_calls();
        assert_eq!(calls.len(), 1);
        let crate::platform::mock::Call::Batch(moves) = &calls[0] else {
            panic!("expected a batch");
        };
        assert_eq!(moves.len(), 3);
        assert_eq!(sim.time_ticks, 1);
    }

    #[test]
    fn test_long_run_keeps_invariants() {
        let wm = setup();
        let mut sim = Simulation::new(11, SizeRequest::Ratio(0.2, 0.2));
        for name in ["a", "b", "c", "d"] {
            open(&wm, &mut sim, name, 1);
        }
        open(&wm, &mut sim, "e", 2);
        for _ in 0..1_000 {
            sim.tick(&wm);
            assert!(sim.bodies().iter().all(in_bounds));
            assert!(!any_overlap(sim.bodies()));
        }
        assert_eq!(sim.len(), 5);
    }

    #[test]
    fn test_focus_change_relaxes_and_cleans_up() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);

        // Looking at an empty workspace: animations come back, workspace 1 stays engaged
        sim.on_arena_focus_change(&wm, ArenaId(5));
        assert!(*wm.animations.borrow());
        assert!(sim.suppression().is_engaged(ArenaId(1)));

        // Back on the bouncing workspace
        sim.on_arena_focus_change(&wm, ArenaId(1));
        assert!(!*wm.animations.borrow());

        // Window closed while we look elsewhere: cleanup releases workspace 1
        wm.remove_client(&BodyId::new("a"));
        sim.reconcile(&wm);
        sim.on_arena_focus_change(&wm, ArenaId(3));
        assert!(sim.suppression().engaged().is_empty());
        assert!(*wm.animations.borrow());
    }

    #[test]
    fn test_entity_focus_change() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);
        wm.add_client(client("editor", 2, [0, 0], [100, 100], false));
        wm.add_client(client("term", 1, [0, 0], [100, 100], false));

        // Untracked window on a bouncing workspace: nothing changes
        sim.on_entity_focus_change(&wm, &BodyId::new("term"));
        assert!(!*wm.animations.borrow());

        // Untracked window elsewhere: animations come back
        sim.on_entity_focus_change(&wm, &BodyId::new("editor"));
        assert!(*wm.animations.borrow());

        // Focusing a bouncing window forces them off again
        sim.on_entity_focus_change(&wm, &BodyId::new("a"));
        assert!(!*wm.animations.borrow());
    }

    #[test]
    fn test_shutdown_restores_animations() {
        let wm = setup();
        let mut sim = Simulation::new(1, SizeRequest::Default);
        open(&wm, &mut sim, "a", 1);
        open(&wm, &mut sim, "b", 2);
        sim.shutdown(&wm);
        assert!(sim.is_empty());
        assert_eq!(wm.animation_writes(), vec![false, true]);
    }
}
