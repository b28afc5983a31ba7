#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Parameterized best-first search over a [`CellMap`].
//!
//! [`SearchEngine`] runs A* with pluggable [`Heuristic`] and [`EdgeCost`]
//! policies. Binding a zero heuristic and an undirected step cost recovers
//! Dijkstra; the [`Algorithm`] registry names both bindings. Every cell the
//! search touches is marked through [`CellMap::put_cell`], so a wrapping map
//! observes the full visual history of a run.

mod cost;
mod open_set;
mod pacer;

use std::{collections::HashMap, fmt, time::Duration};

use pathviz_core::{CellState, Path, Position};
use pathviz_world::CellMap;

pub use cost::{
    EdgeCost, GoalBiasedCost, Heuristic, PlainSquaredCost, SquaredDistance, ZeroHeuristic,
};
pub use open_set::OpenSet;
pub use pacer::{NoPause, Pacer, ThreadPacer};

/// Result of a single search call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    path: Path,
    expanded: usize,
    evaluated: usize,
}

impl SearchOutcome {
    /// Path from start to goal, empty when the goal is unreachable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consumes the outcome, yielding the path.
    #[must_use]
    pub fn into_path(self) -> Path {
        self.path
    }

    /// Number of positions removed from the frontier and expanded.
    #[must_use]
    pub const fn expanded(&self) -> usize {
        self.expanded
    }

    /// Number of neighbour evaluations performed.
    #[must_use]
    pub const fn evaluated(&self) -> usize {
        self.evaluated
    }
}

/// Best-first search bound to a heuristic and an edge-cost policy.
#[derive(Clone, Copy, Debug)]
pub struct SearchEngine<H, D> {
    heuristic: H,
    edge_cost: D,
}

impl Default for SearchEngine<SquaredDistance, GoalBiasedCost> {
    fn default() -> Self {
        Self::new(SquaredDistance, GoalBiasedCost::default())
    }
}

impl<H, D> SearchEngine<H, D>
where
    H: Heuristic,
    D: EdgeCost,
{
    /// Creates an engine from the provided policies.
    #[must_use]
    pub const fn new(heuristic: H, edge_cost: D) -> Self {
        Self {
            heuristic,
            edge_cost,
        }
    }

    /// Searches for a path from `start` to `goal` across `world`.
    ///
    /// `start` and `goal` must be non-solid. Each neighbour evaluation marks
    /// the neighbour [`CellState::Calculating`], pauses for `step_delay`
    /// when it is non-zero, then marks it [`CellState::Calculated`]. An
    /// unreachable goal yields an empty path.
    pub fn search<W, P>(
        &self,
        start: Position,
        goal: Position,
        world: &mut W,
        step_delay: Duration,
        pacer: &mut P,
    ) -> SearchOutcome
    where
        W: CellMap + ?Sized,
        P: Pacer + ?Sized,
    {
        let _ = world.put_cell(CellState::Start, start);
        if start == goal {
            return SearchOutcome {
                path: Path::from_positions(vec![start]),
                expanded: 0,
                evaluated: 0,
            };
        }
        let _ = world.put_cell(CellState::Goal, goal);

        let mut open = OpenSet::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut g_score: HashMap<Position, f64> = HashMap::new();
        let _ = g_score.insert(start, 0.0);
        open.upsert(start, self.heuristic.estimate(start, goal));

        let mut expanded = 0;
        let mut evaluated = 0;

        while let Some(current) = open.pop() {
            if current == goal {
                let path = reconstruct(&came_from, start, goal, world, step_delay, pacer);
                return SearchOutcome {
                    path,
                    expanded,
                    evaluated,
                };
            }
            expanded += 1;

            let current_score = score(&g_score, current);
            for neighbour in world.neighbours(current, false) {
                let _ = world.put_cell(CellState::Calculating, neighbour);
                pace(pacer, step_delay);
                let _ = world.put_cell(CellState::Calculated, neighbour);
                evaluated += 1;

                let tentative =
                    current_score + self.edge_cost.cost(current, neighbour, start, goal);
                if tentative < score(&g_score, neighbour) {
                    let _ = came_from.insert(neighbour, current);
                    let _ = g_score.insert(neighbour, tentative);
                    open.upsert(neighbour, tentative + self.heuristic.estimate(neighbour, goal));
                }
            }
        }

        SearchOutcome {
            path: Path::empty(),
            expanded,
            evaluated,
        }
    }
}

fn score(scores: &HashMap<Position, f64>, position: Position) -> f64 {
    scores.get(&position).copied().unwrap_or(f64::INFINITY)
}

fn pace<P>(pacer: &mut P, step_delay: Duration)
where
    P: Pacer + ?Sized,
{
    if !step_delay.is_zero() {
        pacer.pause(step_delay);
    }
}

fn reconstruct<W, P>(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
    world: &mut W,
    step_delay: Duration,
    pacer: &mut P,
) -> Path
where
    W: CellMap + ?Sized,
    P: Pacer + ?Sized,
{
    let mut current = goal;
    let mut positions = vec![goal];
    let _ = world.put_cell(CellState::Path, goal);

    while current != start {
        let Some(&previous) = came_from.get(&current) else {
            break;
        };
        pace(pacer, step_delay);
        current = previous;
        positions.push(current);
        let _ = world.put_cell(CellState::Path, current);
    }

    positions.reverse();
    Path::from_positions(positions)
}

/// Fixed registry of the selectable search bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Squared-distance heuristic with the goal-biased edge cost.
    AStar,
    /// Zero heuristic with the plain squared edge cost.
    Dijkstra,
}

impl Algorithm {
    /// Registry entries in index order.
    pub const ALL: [Algorithm; 2] = [Algorithm::AStar, Algorithm::Dijkstra];

    /// Looks up a registry entry by index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Looks up a registry entry by short or long name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|algorithm| {
            algorithm.short_name().eq_ignore_ascii_case(name)
                || algorithm.long_name().eq_ignore_ascii_case(name)
        })
    }

    /// Position of the entry in [`Algorithm::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::AStar => 0,
            Self::Dijkstra => 1,
        }
    }

    /// Compact display name.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::AStar => "A*",
            Self::Dijkstra => "Dijkstra",
        }
    }

    /// Identifier-friendly name.
    #[must_use]
    pub const fn long_name(self) -> &'static str {
        match self {
            Self::AStar => "AStar",
            Self::Dijkstra => "Dijkstra",
        }
    }

    /// Runs the search with this entry's policy binding.
    pub fn search<W, P>(
        self,
        start: Position,
        goal: Position,
        world: &mut W,
        step_delay: Duration,
        pacer: &mut P,
    ) -> SearchOutcome
    where
        W: CellMap + ?Sized,
        P: Pacer + ?Sized,
    {
        match self {
            Self::AStar => SearchEngine::default().search(start, goal, world, step_delay, pacer),
            Self::Dijkstra => SearchEngine::new(ZeroHeuristic, PlainSquaredCost)
                .search(start, goal, world, step_delay, pacer),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
