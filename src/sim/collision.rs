//! Collision detection and response for bouncing windows
//!
//! Two kinds of contact per tick:
//! - border: clamp back inside the arena and bounce if still heading out
//! - body/body: push apart along the axis of least penetration, then trade
//!   velocities on that axis if the pair is closing in
//!
//! A pair push never moves a body through a wall: a body without room keeps
//! its place and its partner takes the whole correction.

use glam::Vec2;

use super::body::Body;
use crate::consts::SEPARATION_PASSES;

/// Separation axis for a body/body contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// Result of a body/body check
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    /// Axis the pair was separated along
    pub axis: Axis,
    /// Penetration depth along `axis` before correction
    pub penetration: f32,
    /// Whether the velocities on `axis` were exchanged
    pub swapped: bool,
}

/// Clamp a body into its arena, inverting velocity on any axis still heading out
///
/// Returns true if any axis bounced.
pub fn resolve_border(body: &mut Body) -> bool {
    let max = body.arena.max_position(body.size);
    let mut bounced = false;

    for axis in 0..2 {
        let vel = body.vel[axis];
        if body.pos[axis] <= 0.0 {
            body.pos[axis] = 0.0;
            if vel < 0 {
                body.vel[axis] = -vel;
                bounced = true;
            }
        } else if body.pos[axis] >= max[axis] {
            body.pos[axis] = max[axis];
            if vel > 0 {
                body.vel[axis] = -vel;
                bounced = true;
            }
        }
    }

    bounced
}

/// Separate two overlapping bodies in the same arena
///
/// `a` is the body with the lower index; on equal coordinates it is the one
/// pushed toward the negative side.
pub fn resolve_pair(a: &mut Body, b: &mut Body) -> Option<Contact> {
    if a.arena_id() != b.arena_id() {
        return None;
    }
    let (ra, rb) = (a.rect(), b.rect());
    if !ra.overlaps(&rb) {
        return None;
    }

    let extent = ra.overlap_extent(&rb);
    let axis = if extent.x < extent.y { Axis::X } else { Axis::Y };
    let i = axis.index();
    let penetration = extent[i];

    let (low, high) = if a.pos[i] <= b.pos[i] { (a, b) } else { (b, a) };
    let (low_shift, high_shift) = split_push(penetration, low.pos[i], high.arena.max_position(high.size)[i] - high.pos[i]);
    low.pos[i] -= low_shift;
    high.pos[i] += high_shift;

    // Only trade when closing in, so a pair already drifting apart is left alone
    let swapped = low.vel[i] > 0 && high.vel[i] < 0;
    if swapped {
        std::mem::swap(&mut low.vel[i], &mut high.vel[i]);
    }

    Some(Contact {
        axis,
        penetration,
        swapped,
    })
}

/// Split `penetration` into (toward negative, toward positive) shifts
///
/// Half each in whole pixels, the odd pixel going to the side with more
/// room. A side without room (`low_room` to the near wall, `high_room` to
/// the far one) hands its share to the other.
fn split_push(penetration: f32, low_room: f32, high_room: f32) -> (f32, f32) {
    let (low_room, high_room) = (low_room.max(0.0), high_room.max(0.0));
    let half = (penetration / 2.0).floor();
    let odd = penetration - 2.0 * half;
    let (mut low, mut high) = if low_room > high_room {
        (half + odd, half)
    } else {
        (half, half + odd)
    };
    if low > low_room {
        high += low - low_room;
        low = low_room;
    }
    if high > high_room {
        low = (low + high - high_room).min(low_room);
        high = high_room;
    }
    (low, high)
}

/// Resolve every border and pair contact for one tick
///
/// Borders first, so every pair push starts from in-bounds positions. Pairs
/// are visited in index order, each unordered pair once per pass; passes
/// repeat while a push created a new contact, up to `SEPARATION_PASSES`.
/// A final border pass only fixes velocities still heading into a wall.
/// Returns the contacts found, in visiting order.
pub fn resolve_collisions(bodies: &mut [Body]) -> Vec<Contact> {
    for body in bodies.iter_mut() {
        resolve_border(body);
    }

    let mut contacts = Vec::new();
    for _ in 0..SEPARATION_PASSES {
        let found = contacts.len();
        for i in 0..bodies.len() {
            let (head, tail) = bodies.split_at_mut(i + 1);
            let body = &mut head[i];
            for other in tail.iter_mut() {
                if let Some(contact) = resolve_pair(body, other) {
                    contacts.push(contact);
                }
            }
        }
        if contacts.len() == found {
            break;
        }
    }

    for body in bodies.iter_mut() {
        resolve_border(body);
    }

    contacts
}

/// Whether any two same-arena bodies overlap
pub fn any_overlap(bodies: &[Body]) -> bool {
    bodies.iter().enumerate().any(|(i, a)| {
        bodies[i + 1..]
            .iter()
            .any(|b| a.arena_id() == b.arena_id() && a.rect().overlaps(&b.rect()))
    })
}

/// Indices of bodies overlapping a same-arena body, ascending
pub fn overlapping(bodies: &[Body]) -> Vec<usize> {
    let mut hit = vec![false; bodies.len()];
    for (i, a) in bodies.iter().enumerate() {
        for (j, b) in bodies.iter().enumerate().skip(i + 1) {
            if a.arena_id() == b.arena_id() && a.rect().overlaps(&b.rect()) {
                hit[i] = true;
                hit[j] = true;
            }
        }
    }
    hit.iter().enumerate().filter(|(_, h)| **h).map(|(i, _)| i).collect()
}

/// Whether a body sits within `[0, arena - size]` on both axes
pub fn in_bounds(body: &Body) -> bool {
    let max = body.arena.max_position(body.size);
    body.pos.cmpge(Vec2::ZERO).all() && body.pos.cmple(max).all()
}
