#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Producer side of pathviz: accepts run requests and executes them.
//!
//! A [`Runner`] admits one run at a time through a [`RunGate`]. Each
//! accepted request builds a fresh world on a named background thread,
//! scatters random walls, picks the endpoints, runs the selected search and
//! streams every mutation to the consumer through an update channel. The
//! search is fenced to the world's search extent, so runs on borderless
//! worlds end even when the goal is enclosed.

mod gate;

use std::{
    io,
    thread::{self, JoinHandle},
};

use crossbeam_channel::Sender;
use pathviz_core::{CellChange, CellState, Position, RunRequest, Update};
use pathviz_system_search::{Algorithm, Pacer, SearchOutcome, ThreadPacer};
use pathviz_system_streaming::{StreamMode, UpdateChannel, UpdateSink};
use pathviz_world::{CellMap, Fenced, GridWorld};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

pub use gate::{RunGate, RunPermit, RunState};

const RUN_THREAD_NAME: &str = "pathviz-run";

/// Failures raised while dispatching a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The request named an algorithm outside the registry.
    #[error("no algorithm registered at index {0}")]
    UnknownAlgorithm(usize),
    /// The background thread could not be started.
    #[error("failed to spawn run thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    algorithm: Algorithm,
    seed: u64,
    endpoints: Option<(Position, Position)>,
    outcome: SearchOutcome,
    cells: Vec<CellChange>,
}

impl RunReport {
    /// Algorithm the run used.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Seed the world generator was initialized with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Start and goal, absent when the world had no cells.
    #[must_use]
    pub const fn endpoints(&self) -> Option<(Position, Position)> {
        self.endpoints
    }

    /// Search result including expansion statistics.
    #[must_use]
    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }

    /// Non-empty cells of the producer's world when the run ended.
    #[must_use]
    pub fn cells(&self) -> &[CellChange] {
        &self.cells
    }
}

/// Handle to a run executing on its background thread.
#[derive(Debug)]
pub struct RunHandle {
    seed: u64,
    algorithm: Algorithm,
    handle: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Seed the run was started with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Algorithm the run executes.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Reports whether the background thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the run to finish and returns its report.
    pub fn join(self) -> thread::Result<RunReport> {
        self.handle.join()
    }
}

/// Accepts run requests and streams their progress to one consumer.
#[derive(Debug)]
pub struct Runner<P = ThreadPacer> {
    gate: RunGate,
    updates: Sender<Update>,
    pacer: P,
}

impl Runner<ThreadPacer> {
    /// Creates a runner that sleeps the run thread between animated steps.
    #[must_use]
    pub fn new(updates: Sender<Update>) -> Self {
        Self::with_pacer(updates, ThreadPacer)
    }
}

impl<P> Runner<P>
where
    P: Pacer + Clone + Send + 'static,
{
    /// Creates a runner that pauses animated steps through `pacer`.
    #[must_use]
    pub fn with_pacer(updates: Sender<Update>, pacer: P) -> Self {
        Self {
            gate: RunGate::new(),
            updates,
            pacer,
        }
    }

    /// Gate guarding the single run slot.
    #[must_use]
    pub fn gate(&self) -> &RunGate {
        &self.gate
    }

    /// Starts a run for `request` on a background thread.
    ///
    /// Returns `Ok(None)` without side effects while another run is in
    /// flight.
    pub fn submit(&self, request: RunRequest) -> Result<Option<RunHandle>, RunnerError> {
        let algorithm = Algorithm::from_index(request.algorithm_index)
            .ok_or(RunnerError::UnknownAlgorithm(request.algorithm_index))?;

        let Some(permit) = self.gate.try_acquire() else {
            debug!("run request dropped: a run is already in flight");
            return Ok(None);
        };

        let seed = request.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let sink = self.updates.clone();
        let pacer = self.pacer.clone();

        let handle = thread::Builder::new()
            .name(RUN_THREAD_NAME.into())
            .spawn(move || execute(&request, algorithm, seed, sink, pacer, permit))?;

        Ok(Some(RunHandle {
            seed,
            algorithm,
            handle,
        }))
    }
}

fn execute<S, P>(
    request: &RunRequest,
    algorithm: Algorithm,
    seed: u64,
    sink: S,
    mut pacer: P,
    permit: RunPermit,
) -> RunReport
where
    S: UpdateSink,
    P: Pacer,
{
    info!(
        algorithm = %algorithm,
        seed,
        width = request.world_width,
        height = request.world_height,
        animated = request.is_animated(),
        "run started"
    );

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let world = GridWorld::new(request.world_width, request.world_height, request.has_boundary);
    let mut channel = UpdateChannel::new(world, sink, StreamMode::for_request(request));

    channel.begin_run();
    channel.clear_map();

    let endpoints = channel
        .world()
        .pick_random_pos(&mut rng)
        .zip(channel.world().pick_random_pos(&mut rng));

    let outcome = match endpoints {
        Some((start, goal)) => {
            let walls = scatter_walls(&mut channel, &mut rng, start, goal);
            debug!(walls, %start, %goal, "world generated");
            let (min, max) = channel.world().search_extent();
            let mut fenced = Fenced::new(&mut channel, min, max);
            algorithm.search(start, goal, &mut fenced, request.step_delay, &mut pacer)
        }
        None => SearchOutcome::default(),
    };

    let cells = channel.world().occupied_cells();
    channel.flush();
    drop(permit);
    channel.end_run();

    info!(
        algorithm = %algorithm,
        path_len = outcome.path().len(),
        expanded = outcome.expanded(),
        evaluated = outcome.evaluated(),
        "run finished"
    );

    RunReport {
        algorithm,
        seed,
        endpoints,
        outcome,
        cells,
    }
}

/// Writes walls at random cells other than the endpoints.
///
/// Makes one attempt per three cells, rounded up, and returns the number of
/// attempts that wrote a wall.
fn scatter_walls<S, R>(
    channel: &mut UpdateChannel<S>,
    rng: &mut R,
    start: Position,
    goal: Position,
) -> usize
where
    S: UpdateSink,
    R: Rng + ?Sized,
{
    let (width, height) = channel.world().size();
    let attempts = (u64::from(width) * u64::from(height) + 2) / 3;

    let mut written = 0;
    for _ in 0..attempts {
        let Some(position) = channel.world().pick_random_pos(rng) else {
            break;
        };
        if position == start || position == goal {
            continue;
        }
        if channel.put_cell(CellState::Wall, position) == CellState::Wall {
            written += 1;
        }
    }
    written
}
