//! Heuristic and edge-cost policies the engine is parameterized by.

use pathviz_core::Position;

/// Estimates the remaining cost from a position to the goal.
pub trait Heuristic {
    /// Returns the estimated cost of reaching `goal` from `position`.
    fn estimate(&self, position: Position, goal: Position) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(Position, Position) -> f64,
{
    fn estimate(&self, position: Position, goal: Position) -> f64 {
        self(position, goal)
    }
}

/// Prices a single step between adjacent positions.
pub trait EdgeCost {
    /// Returns the cost of moving from `current` to `next`.
    fn cost(&self, current: Position, next: Position, start: Position, goal: Position) -> f64;
}

impl<F> EdgeCost for F
where
    F: Fn(Position, Position, Position, Position) -> f64,
{
    fn cost(&self, current: Position, next: Position, start: Position, goal: Position) -> f64 {
        self(current, next, start, goal)
    }
}

/// Squared Euclidean distance to the goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SquaredDistance;

impl Heuristic for SquaredDistance {
    fn estimate(&self, position: Position, goal: Position) -> f64 {
        squared(position, goal)
    }
}

/// Heuristic that estimates nothing, turning the search into Dijkstra.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _position: Position, _goal: Position) -> f64 {
        0.0
    }
}

/// Squared step length, multiplied when the step moves away from the goal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalBiasedCost {
    away_factor: f64,
}

impl GoalBiasedCost {
    /// Multiplier applied to steps that increase the distance to the goal.
    pub const DEFAULT_AWAY_FACTOR: f64 = 10.0;

    /// Creates the policy with a custom away multiplier.
    #[must_use]
    pub const fn with_away_factor(away_factor: f64) -> Self {
        Self { away_factor }
    }

    /// Multiplier applied to steps that increase the distance to the goal.
    #[must_use]
    pub const fn away_factor(&self) -> f64 {
        self.away_factor
    }
}

impl Default for GoalBiasedCost {
    fn default() -> Self {
        Self::with_away_factor(Self::DEFAULT_AWAY_FACTOR)
    }
}

impl EdgeCost for GoalBiasedCost {
    fn cost(&self, current: Position, next: Position, _start: Position, goal: Position) -> f64 {
        let step = squared(current, next);
        if next.distance_squared(goal) > current.distance_squared(goal) {
            step * self.away_factor
        } else {
            step
        }
    }
}

/// Squared step length without any directional penalty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlainSquaredCost;

impl EdgeCost for PlainSquaredCost {
    fn cost(&self, current: Position, next: Position, _start: Position, _goal: Position) -> f64 {
        squared(current, next)
    }
}

fn squared(from: Position, to: Position) -> f64 {
    from.distance_squared(to) as f64
}
