#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for pathviz runs.
//!
//! [`GridWorld`] is a sparse store of [`CellState`] values: any coordinate
//! that was never written reads as [`CellState::Empty`], and when the world
//! has a boundary every coordinate outside its extent reads as
//! [`CellState::Wall`]. The [`CellMap`] trait is the surface the search
//! engine works against, so a world can be searched directly or through a
//! wrapper that reports each mutation.

mod neighbours;

use std::collections::HashMap;

use pathviz_core::{CellChange, CellState, Position};
use rand::Rng;

pub use neighbours::Neighbours;

/// Mutable cell store shared by the world and the wrappers around it.
pub trait CellMap {
    /// Returns the state of the cell, applying the boundary rule first.
    fn cell(&self, position: Position) -> CellState;

    /// Writes a state and returns the state the cell holds afterwards.
    fn put_cell(&mut self, state: CellState, position: Position) -> CellState;

    /// Resets every stored cell to [`CellState::Empty`].
    fn clear_map(&mut self);

    /// Reports whether the cell blocks traversal.
    fn is_solid(&self, position: Position) -> bool {
        self.cell(position).is_solid()
    }

    /// Reports whether the cell currently holds `state`.
    fn is_cell_type(&self, state: CellState, position: Position) -> bool {
        self.cell(position) == state
    }

    /// Enumerates the non-solid neighbours of a cell.
    ///
    /// The four orthogonal neighbours come first in the order east, west,
    /// south, north. With `diagonals` the four diagonal neighbours follow.
    fn neighbours(&self, position: Position, diagonals: bool) -> Neighbours {
        Neighbours::collect_from(position, diagonals, |candidate| self.is_solid(candidate))
    }

    /// Stamps the border of an axis-aligned rectangle with `state`.
    ///
    /// Every border cell is written once. A zero width or height writes
    /// nothing.
    fn hollow_rect(&mut self, state: CellState, x: i32, y: i32, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let right = width - 1;
        let bottom = height - 1;
        for column in 0..width {
            let cell_x = x.wrapping_add_unsigned(column);
            if column == 0 || column == right {
                for row in 0..height {
                    let cell_y = y.wrapping_add_unsigned(row);
                    let _ = self.put_cell(state, Position::new(cell_x, cell_y));
                }
            } else {
                let _ = self.put_cell(state, Position::new(cell_x, y));
                if bottom > 0 {
                    let cell_y = y.wrapping_add_unsigned(bottom);
                    let _ = self.put_cell(state, Position::new(cell_x, cell_y));
                }
            }
        }
    }
}

/// View of a map that reads every cell outside a rectangle as a wall.
///
/// Writes outside the rectangle are dropped and report [`CellState::Wall`].
#[derive(Debug)]
pub struct Fenced<'a, M: ?Sized> {
    inner: &'a mut M,
    min: Position,
    max: Position,
}

impl<'a, M> Fenced<'a, M>
where
    M: CellMap + ?Sized,
{
    /// Fences `inner` to the rectangle spanned by the inclusive corners.
    #[must_use]
    pub fn new(inner: &'a mut M, min: Position, max: Position) -> Self {
        Self { inner, min, max }
    }

    /// Reports whether the position lies inside the fence.
    #[must_use]
    pub fn encloses(&self, position: Position) -> bool {
        (self.min.x()..=self.max.x()).contains(&position.x())
            && (self.min.y()..=self.max.y()).contains(&position.y())
    }
}

impl<M> CellMap for Fenced<'_, M>
where
    M: CellMap + ?Sized,
{
    fn cell(&self, position: Position) -> CellState {
        if !self.encloses(position) {
            return CellState::Wall;
        }

        self.inner.cell(position)
    }

    fn put_cell(&mut self, state: CellState, position: Position) -> CellState {
        if !self.encloses(position) {
            return CellState::Wall;
        }

        self.inner.put_cell(state, position)
    }

    fn clear_map(&mut self) {
        self.inner.clear_map();
    }
}

/// Write policy applied to cells that already hold a permanent state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellProtection {
    /// Start, goal and wall cells keep their first written state.
    #[default]
    Permanent,
    /// Every write replaces the stored state.
    None,
}

/// Sparse two-dimensional cell store with optional boundary.
#[derive(Clone, Debug)]
pub struct GridWorld {
    origin: Position,
    width: u32,
    height: u32,
    has_boundary: bool,
    protection: CellProtection,
    cells: HashMap<Position, CellState>,
}

impl GridWorld {
    /// Creates an empty world with permanent-cell protection.
    #[must_use]
    pub fn new(width: u32, height: u32, has_boundary: bool) -> Self {
        Self {
            origin: Position::default(),
            width,
            height,
            has_boundary,
            protection: CellProtection::Permanent,
            cells: HashMap::new(),
        }
    }

    /// Replaces the presentation origin of the world.
    #[must_use]
    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    /// Replaces the write policy applied to permanent cells.
    #[must_use]
    pub fn with_protection(mut self, protection: CellProtection) -> Self {
        self.protection = protection;
        self
    }

    /// Offset at which renderers should place the world's first cell.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Width and height of the world measured in cells.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reports whether coordinates outside the world read as walls.
    #[must_use]
    pub const fn has_boundary(&self) -> bool {
        self.has_boundary
    }

    /// Write policy applied to permanent cells.
    #[must_use]
    pub const fn protection(&self) -> CellProtection {
        self.protection
    }

    /// Reports whether the position lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        u32::try_from(position.x()).map_or(false, |x| x < self.width)
            && u32::try_from(position.y()).map_or(false, |y| y < self.height)
    }

    /// Draws a position uniformly from the world's extent.
    ///
    /// Returns `None` when the world has no cells.
    pub fn pick_random_pos<R>(&self, rng: &mut R) -> Option<Position>
    where
        R: Rng + ?Sized,
    {
        if self.width == 0 || self.height == 0 {
            return None;
        }

        let x = rng.gen_range(0..self.width);
        let y = rng.gen_range(0..self.height);
        Some(Position::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?))
    }

    /// Stored non-empty cells sorted by position.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<CellChange> {
        let mut cells: Vec<CellChange> = self
            .cells
            .iter()
            .filter(|(_, state)| **state != CellState::Empty)
            .map(|(position, state)| CellChange::new(*state, *position))
            .collect();
        cells.sort_by_key(|change| change.position());
        cells
    }

    /// Smallest rectangle, as inclusive corners, that holds every route
    /// between two cells of the world.
    ///
    /// A bounded world returns its own extent. A borderless world adds a one
    /// cell ring around the extent: walls only ever land inside the extent,
    /// so the ring is free and any detour further out can follow it instead.
    #[must_use]
    pub fn search_extent(&self) -> (Position, Position) {
        let right = i32::try_from(self.width).unwrap_or(i32::MAX);
        let bottom = i32::try_from(self.height).unwrap_or(i32::MAX);
        if self.has_boundary {
            (Position::new(0, 0), Position::new(right - 1, bottom - 1))
        } else {
            (Position::new(-1, -1), Position::new(right, bottom))
        }
    }

    /// Number of explicitly stored cells, empty ones included.
    #[must_use]
    pub fn stored_len(&self) -> usize {
        self.cells.len()
    }
}

impl CellMap for GridWorld {
    fn cell(&self, position: Position) -> CellState {
        if self.has_boundary && !self.contains(position) {
            return CellState::Wall;
        }

        self.cells.get(&position).copied().unwrap_or_default()
    }

    fn put_cell(&mut self, state: CellState, position: Position) -> CellState {
        let existing = self.cell(position);
        if self.protection == CellProtection::Permanent && existing.is_permanent() {
            return existing;
        }

        let _ = self.cells.insert(position, state);
        state
    }

    fn clear_map(&mut self) {
        self.cells.clear();
    }
}
