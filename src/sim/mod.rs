//! Bouncing-window simulation
//!
//! The physics here is deliberately simple and deterministic:
//! - Integer velocities, one step per tick
//! - Seeded RNG only (placement, initial directions, jitter)
//! - Stable iteration order (insertion order of bodies)
//!
//! Only `manager` talks to the compositor; everything else is pure.

pub mod arena;
pub mod body;
pub mod collision;
pub mod manager;
pub mod placement;
pub mod rect;
pub mod suppression;
pub mod tick;

pub use arena::{Arena, ArenaId};
pub use body::{Body, BodyId, SizeRequest, random_velocity};
pub use collision::{Axis, Contact, resolve_border, resolve_collisions, resolve_pair};
pub use manager::{Simulation, Spawn};
pub use placement::{PlacementFailed, place};
pub use rect::Rect;
pub use suppression::Suppression;
pub use tick::{StepReport, step};
