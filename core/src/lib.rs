#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the pathviz workspace.
//!
//! This crate defines the message surface that connects the producer (the
//! world plus the search engine running on a background thread) with the
//! consumer (the renderer). The consumer submits a [`RunRequest`] describing
//! the run it wants, the producer mutates its private world, and every
//! mutation travels back as an [`Update`] in emission order. The consumer
//! never reads the producer's world directly.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Integer grid coordinate usable as an exact map key.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Squared Euclidean distance between two coordinates.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Semantic marking carried by a single grid cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CellState {
    /// Free cell; the implicit state of every unset coordinate.
    #[default]
    Empty,
    /// Solid obstacle.
    Wall,
    /// Origin of the current search.
    Start,
    /// Destination of the current search.
    Goal,
    /// Neighbour currently being evaluated by the search.
    Calculating,
    /// Neighbour whose evaluation finished.
    Calculated,
    /// Cell on the reconstructed path.
    Path,
}

impl CellState {
    /// Every cell state in declaration order.
    pub const ALL: [CellState; 7] = [
        CellState::Empty,
        CellState::Wall,
        CellState::Start,
        CellState::Goal,
        CellState::Calculating,
        CellState::Calculated,
        CellState::Path,
    ];

    /// Reports whether the state blocks traversal.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Reports whether the state survives later writes in a protected world.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Start | Self::Goal | Self::Wall)
    }

    /// Human readable label of the state.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Wall => "Wall",
            Self::Start => "Start",
            Self::Goal => "Goal",
            Self::Calculating => "Calculating",
            Self::Calculated => "Calculated",
            Self::Path => "Path",
        }
    }

    /// Single character used by text renderers.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '#',
            Self::Start => 'S',
            Self::Goal => 'G',
            Self::Calculating => '?',
            Self::Calculated => '+',
            Self::Path => '*',
        }
    }
}

/// A single cell mutation announced by the producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellChange {
    state: CellState,
    position: Position,
}

impl CellChange {
    /// Creates a new cell change descriptor.
    #[must_use]
    pub const fn new(state: CellState, position: Position) -> Self {
        Self { state, position }
    }

    /// State the cell holds after the mutation.
    #[must_use]
    pub const fn state(&self) -> CellState {
        self.state
    }

    /// Coordinate of the mutated cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Messages streamed from the producer to the consumer.
///
/// Delivery order equals emission order. A [`Update::Batch`] is one atomic
/// group of cell changes; its boundaries need not align with search steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Update {
    /// The producer accepted a request and the map is busy.
    RunStarted,
    /// The run finished and the final state has been delivered.
    RunEnded,
    /// The consumer should clear its local render state.
    MapReset,
    /// A single cell change to apply immediately.
    Cell(CellChange),
    /// An ordered group of cell changes to apply together.
    Batch(Vec<CellChange>),
}

/// Run configuration submitted by the consumer.
///
/// Requests are validated by whoever builds them; the producer trusts the
/// values it receives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Width of the world measured in cells.
    pub world_width: u32,
    /// Height of the world measured in cells.
    pub world_height: u32,
    /// Whether coordinates outside the world read as walls.
    pub has_boundary: bool,
    /// Pause inserted at every search step. Zero selects batch streaming.
    pub step_delay: Duration,
    /// Number of queued cell changes that triggers a batch flush.
    pub max_batch_size: usize,
    /// Index into the fixed algorithm registry.
    pub algorithm_index: usize,
    /// Seed for the world generator; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl RunRequest {
    /// Reports whether the run streams every mutation individually.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        !self.step_delay.is_zero()
    }
}

/// Ordered sequence of coordinates from start to goal inclusive.
///
/// An empty path is the normal outcome of a search that cannot reach its
/// goal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    positions: Vec<Position>,
}

impl Path {
    /// Path describing an unreachable goal.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// Wraps positions already ordered from start to goal.
    #[must_use]
    pub fn from_positions(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Positions in start to goal order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of positions on the path, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Reports whether the search failed to reach its goal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// First position of the path.
    #[must_use]
    pub fn start(&self) -> Option<Position> {
        self.positions.first().copied()
    }

    /// Last position of the path.
    #[must_use]
    pub fn goal(&self) -> Option<Position> {
        self.positions.last().copied()
    }

    /// Iterator over the positions in start to goal order.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    /// Consumes the path, yielding the underlying positions.
    #[must_use]
    pub fn into_vec(self) -> Vec<Position> {
        self.positions
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positions.is_empty() {
            return write!(f, "no path");
        }

        for (index, position) in self.positions.iter().enumerate() {
            if index > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{position}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CellChange, CellState, Path, Position, RunRequest, Update};
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    #[test]
    fn distance_squared_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, 5);
        assert_eq!(origin.distance_squared(destination), 25);
        assert_eq!(destination.distance_squared(origin), 25);
        assert_eq!(origin.distance_squared(origin), 0);
    }

    #[test]
    fn distance_squared_handles_negative_coordinates() {
        let left = Position::new(-3, -4);
        assert_eq!(left.distance_squared(Position::new(0, 0)), 25);
    }

    #[test]
    fn only_walls_are_solid() {
        let solid: Vec<_> = CellState::ALL
            .into_iter()
            .filter(|state| state.is_solid())
            .collect();
        assert_eq!(solid, vec![CellState::Wall]);
    }

    #[test]
    fn permanent_states_are_start_goal_and_wall() {
        let permanent: Vec<_> = CellState::ALL
            .into_iter()
            .filter(|state| state.is_permanent())
            .collect();
        assert_eq!(
            permanent,
            vec![CellState::Wall, CellState::Start, CellState::Goal]
        );
    }

    #[test]
    fn glyphs_are_unique() {
        let mut glyphs: Vec<char> = CellState::ALL.iter().map(|state| state.glyph()).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), CellState::ALL.len());
    }

    #[test]
    fn path_display_lists_positions_in_order() {
        let path = Path::from_positions(vec![Position::new(0, 0), Position::new(1, 0)]);
        assert_eq!(path.to_string(), "(0,0) -> (1,0)");
        assert_eq!(Path::empty().to_string(), "no path");
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn batch_update_round_trips_through_bincode() {
        let update = Update::Batch(vec![
            CellChange::new(CellState::Wall, Position::new(3, -2)),
            CellChange::new(CellState::Path, Position::new(0, 7)),
        ]);
        assert_round_trip(&update);
    }

    #[test]
    fn run_request_round_trips_through_bincode() {
        let request = RunRequest {
            world_width: 30,
            world_height: 15,
            has_boundary: true,
            step_delay: Duration::from_millis(25),
            max_batch_size: 10,
            algorithm_index: 1,
            seed: Some(7),
        };
        assert_round_trip(&request);
        assert!(request.is_animated());
    }
}
