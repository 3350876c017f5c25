//! Starting positions for new bodies
//!
//! Rejection sampling: pick a random spot inside the arena and keep it if it
//! does not overlap any body already bouncing there.

use glam::Vec2;
use rand::Rng;

use super::arena::Arena;
use super::body::Body;
use super::rect::Rect;
use crate::consts::PLACEMENT_ATTEMPTS;

/// No free spot was found within `PLACEMENT_ATTEMPTS` samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no free spot for a new window after {attempts} attempts")]
pub struct PlacementFailed {
    pub attempts: u32,
}

/// Find a non-overlapping top-left corner for a body of `size` in `arena`
///
/// Only bodies in the same arena are considered obstacles.
pub fn place(size: Vec2, arena: &Arena, existing: &[Body], rng: &mut impl Rng) -> Result<Vec2, PlacementFailed> {
    let span = arena.max_position(size).floor().as_ivec2();
    let obstacles: Vec<Rect> = existing
        .iter()
        .filter(|b| b.arena_id() == arena.id)
        .map(Body::rect)
        .collect();

    for _ in 0..PLACEMENT_ATTEMPTS {
        let x = if span.x > 0 { rng.random_range(0..=span.x) } else { 0 };
        let y = if span.y > 0 { rng.random_range(0..=span.y) } else { 0 };
        let candidate = Rect::new(Vec2::new(x as f32, y as f32), size);
        if !obstacles.iter().any(|o| o.overlaps(&candidate)) {
            return Ok(candidate.pos);
        }
    }

    Err(PlacementFailed {
        attempts: PLACEMENT_ATTEMPTS,
    })
}
