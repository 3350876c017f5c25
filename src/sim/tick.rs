//! Fixed-step advance of the body set
//!
//! Pure physics: no compositor access. The manager wraps this with
//! reconciliation before and the batched move command after.

use std::collections::BTreeSet;

use glam::Vec2;

use super::arena::ArenaId;
use super::body::Body;
use super::collision::{Contact, overlapping, resolve_border, resolve_collisions};

/// Summary of one physics step
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Body/body contacts resolved this step
    pub contacts: Vec<Contact>,
    /// Arenas rolled back to their pre-step positions (jammed pile-ups)
    pub reverted: Vec<ArenaId>,
}

/// Integrate every body by one tick of velocity
pub fn integrate(bodies: &mut [Body]) {
    for body in bodies.iter_mut() {
        body.integrate();
    }
}

/// Advance the bodies by one tick: integrate, then resolve collisions
///
/// If a pile-up is still overlapping after resolution, every body of that
/// arena goes back to where it started the step and the stuck bodies turn
/// around, so a step never ends with more overlap than it began with.
pub fn step(bodies: &mut [Body]) -> StepReport {
    let start: Vec<Vec2> = bodies.iter().map(|b| b.pos).collect();
    integrate(bodies);
    let contacts = resolve_collisions(bodies);

    let stuck = overlapping(bodies);
    let jammed: BTreeSet<ArenaId> = stuck.iter().map(|&i| bodies[i].arena_id()).collect();
    for (body, pos) in bodies.iter_mut().zip(&start) {
        if jammed.contains(&body.arena_id()) {
            body.pos = *pos;
            resolve_border(body);
        }
    }
    for &i in &stuck {
        bodies[i].vel = -bodies[i].vel;
    }
    if !jammed.is_empty() {
        log::debug!("Pile-up on workspace(s) {jammed:?}, step rolled back");
    }

    if !contacts.is_empty() {
        log::trace!("{} contact(s) this tick", contacts.len());
    }
    StepReport {
        contacts,
        reverted: jammed.into_iter().collect(),
    }
}
