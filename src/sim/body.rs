//! Bodies and their size policy
//!
//! A body is one bouncing window. Its position is arena-local and owned by
//! the simulation once it has been synced against Hyprland for the first time.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::arena::{Arena, ArenaId};
use super::rect::Rect;
use crate::consts::DEFAULT_RESIZE_RATIO;

/// Hyprland client address, normalized to carry the `0x` prefix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(String);

impl BodyId {
    pub fn new(address: &str) -> Self {
        let address = address.trim();
        if address.starts_with("0x") {
            Self(address.to_string())
        } else {
            Self(format!("0x{address}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested body size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SizeRequest {
    /// `DEFAULT_RESIZE_RATIO` of the arena on both axes
    #[default]
    Default,
    /// Fraction of the arena per axis, both in (0, 1]
    Ratio(f32, f32),
    /// Absolute pixels
    Pixels(f32, f32),
}

impl SizeRequest {
    /// Classify a raw `(width, height)` pair: both <= 1 are ratios, both > 1
    /// are pixels. Mixed pairs and garbage become `Default`.
    pub fn from_pair(w: f32, h: f32) -> Self {
        if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
            return Self::Default;
        }
        match (w <= 1.0, h <= 1.0) {
            (true, true) => Self::Ratio(w, h),
            (false, false) => Self::Pixels(w, h),
            _ => Self::Default,
        }
    }

    /// Resolve against an arena into whole pixels, clamped to `[1, arena]`
    pub fn resolve(&self, arena: &Arena) -> Vec2 {
        let size = match *self {
            Self::Ratio(w, h) if Self::from_pair(w, h) == *self => ceil_px(arena.size * Vec2::new(w, h)),
            Self::Pixels(w, h) if Self::from_pair(w, h) == *self => Vec2::new(w, h).floor(),
            _ => ceil_px(arena.size * DEFAULT_RESIZE_RATIO),
        };
        size.clamp(Vec2::ONE, arena.size.max(Vec2::ONE))
    }
}

/// Round up to whole pixels, ignoring f32 noise from the ratio multiply
#[inline]
fn ceil_px(v: Vec2) -> Vec2 {
    (v - 1e-3).ceil()
}

impl std::str::FromStr for SizeRequest {
    type Err = std::convert::Infallible;

    /// Parse `WIDTHxHEIGHT` (e.g. `400x300` or `0.3x0.3`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = s
            .trim()
            .split_once(['x', 'X'])
            .and_then(|(w, h)| Some((w.trim().parse::<f32>().ok()?, h.trim().parse::<f32>().ok()?)));
        Ok(match parsed {
            Some((w, h)) => Self::from_pair(w, h),
            None => {
                log::warn!("Ignoring malformed size {s:?}, expected WIDTHxHEIGHT");
                Self::Default
            }
        })
    }
}

/// A simulated window
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    /// Arena this body bounces in, resolved on creation/re-association
    pub arena: Arena,
    /// Arena-local top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per tick
    pub vel: IVec2,
    /// False until the first reconciliation adopted Hyprland's position
    pub position_synced: bool,
}

impl Body {
    pub fn new(id: BodyId, arena: Arena, pos: Vec2, size: Vec2, vel: IVec2) -> Self {
        Self {
            id,
            arena,
            pos,
            size,
            vel,
            position_synced: false,
        }
    }

    #[inline]
    pub fn arena_id(&self) -> ArenaId {
        self.arena.id
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Advance one tick
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel.as_vec2();
    }

    /// Global position as Hyprland expects it
    pub fn global_position(&self) -> IVec2 {
        self.arena.to_global(self.pos).round().as_ivec2()
    }
}

/// Velocity of `speed` per axis with a random sign on each
pub fn random_velocity(rng: &mut impl Rng, speed: i32) -> IVec2 {
    let sign = |flip: bool| if flip { -1 } else { 1 };
    IVec2::new(speed * sign(rng.random_bool(0.5)), speed * sign(rng.random_bool(0.5)))
}
