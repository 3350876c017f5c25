//! Grid tiling for the screensaver's starting positions
//!
//! N windows on an arena get a `cols × rows` grid shaped after the arena's
//! aspect ratio. Each window sits in its own cell, slightly shrunk and
//! randomly nudged so the start does not look like a spreadsheet.

use glam::Vec2;
use rand::Rng;

use crate::consts::{CELL_FILL, DEFAULT_RESIZE_RATIO, JITTER_ATTEMPTS};
use crate::sim::{Arena, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub cols: u32,
    pub rows: u32,
    /// Cell size in pixels
    pub cell: Vec2,
}

impl Grid {
    /// Grid for `count` windows on an arena of `size`
    pub fn for_count(count: usize, size: Vec2) -> Self {
        let n = count.max(1) as f32;
        let cols = if size.y > 0.0 {
            (n * (size.x / size.y)).sqrt().ceil().max(1.0) as u32
        } else {
            n.sqrt().ceil().max(1.0) as u32
        };
        let rows = (count.max(1) as u32).div_ceil(cols);
        Self {
            cols,
            rows,
            cell: size / Vec2::new(cols as f32, rows as f32),
        }
    }

    /// Top-left of the cell hosting window `index` (row-major)
    pub fn cell_origin(&self, index: usize) -> Vec2 {
        let col = index as u32 % self.cols;
        let row = index as u32 / self.cols;
        Vec2::new(col as f32, row as f32) * self.cell
    }

    /// Window size: 90% of a cell, no larger than the default ratio of the
    /// arena or the caller's maximum
    pub fn tile_size(&self, arena: Vec2, max: Option<Vec2>) -> Vec2 {
        let mut size = (self.cell * CELL_FILL).min(arena * DEFAULT_RESIZE_RATIO);
        if let Some(max) = max {
            size = size.min(max);
        }
        size.floor().max(Vec2::ONE)
    }
}

/// Starting rectangles (arena-local) for `count` windows
pub fn layout(count: usize, arena: &Arena, max: Option<Vec2>, rng: &mut impl Rng) -> Vec<Rect> {
    let grid = Grid::for_count(count, arena.size);
    let size = grid.tile_size(arena.size, max);
    let margin = ((grid.cell - size) / 2.0).floor().max(Vec2::ZERO).as_ivec2();
    let limit = arena.max_position(size);

    let mut placed: Vec<Rect> = Vec::with_capacity(count);
    for index in 0..count {
        let centered = (grid.cell_origin(index) + (grid.cell - size) / 2.0).floor();
        let rect = jitter(centered, size, margin, limit, &placed, rng).unwrap_or_else(|| Rect::new(centered, size));
        placed.push(rect);
    }
    placed
}

/// Random offset within the cell margin that stays on the arena and clear of `placed`
fn jitter(
    centered: Vec2,
    size: Vec2,
    margin: glam::IVec2,
    limit: Vec2,
    placed: &[Rect],
    rng: &mut impl Rng,
) -> Option<Rect> {
    for _ in 0..JITTER_ATTEMPTS {
        let dx = if margin.x > 0 { rng.random_range(-margin.x..=margin.x) } else { 0 };
        let dy = if margin.y > 0 { rng.random_range(-margin.y..=margin.y) } else { 0 };
        let pos = centered + Vec2::new(dx as f32, dy as f32);
        if pos.cmplt(Vec2::ZERO).any() || pos.cmpgt(limit).any() {
            continue;
        }
        let candidate = Rect::new(pos, size);
        if !placed.iter().any(|p| p.overlaps(&candidate)) {
            return Some(candidate);
        }
    }
    None
}
