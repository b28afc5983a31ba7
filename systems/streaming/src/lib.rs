#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Streams world mutations to a consumer while a run executes.
//!
//! [`UpdateChannel`] owns the producer's [`GridWorld`] and implements
//! [`CellMap`] on top of it. Every write is forwarded to the world and the
//! effective result is announced to an [`UpdateSink`], either immediately
//! or grouped into bounded batches depending on the [`StreamMode`].

mod sink;

use pathviz_core::{CellChange, CellState, Position, RunRequest, Update};
use pathviz_world::{CellMap, GridWorld};
use tracing::{debug, warn};

pub use sink::{SinkClosed, UpdateSink};

/// Delivery policy for cell changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamMode {
    /// Every change is sent on its own as soon as it happens.
    Animated,
    /// Changes are queued and sent in groups of at most `max_batch_size`.
    Batched {
        /// Queue length that triggers a flush; never zero.
        max_batch_size: usize,
    },
}

impl StreamMode {
    /// Batched policy with `max_batch_size` clamped to at least one.
    #[must_use]
    pub fn batched(max_batch_size: usize) -> Self {
        Self::Batched {
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Policy implied by a run request: animated when it carries a delay.
    #[must_use]
    pub fn for_request(request: &RunRequest) -> Self {
        if request.is_animated() {
            Self::Animated
        } else {
            Self::batched(request.max_batch_size)
        }
    }
}

/// World wrapper that reports every mutation to a sink.
#[derive(Debug)]
pub struct UpdateChannel<S> {
    world: GridWorld,
    sink: S,
    mode: StreamMode,
    queue: Vec<CellChange>,
    sink_open: bool,
}

impl<S> UpdateChannel<S>
where
    S: UpdateSink,
{
    /// Wraps `world`, sending its updates to `sink` under `mode`.
    #[must_use]
    pub fn new(world: GridWorld, sink: S, mode: StreamMode) -> Self {
        let mode = match mode {
            StreamMode::Batched { max_batch_size } => StreamMode::batched(max_batch_size),
            StreamMode::Animated => StreamMode::Animated,
        };
        Self {
            world,
            sink,
            mode,
            queue: Vec::new(),
            sink_open: true,
        }
    }

    /// Announces that the map is busy.
    pub fn begin_run(&mut self) {
        self.emit(Update::RunStarted);
    }

    /// Sends every queued change as one batch. An empty queue sends nothing.
    pub fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        let batch = std::mem::take(&mut self.queue);
        debug!(changes = batch.len(), "flushing cell batch");
        self.emit(Update::Batch(batch));
    }

    /// Flushes the queue and announces that the final state was delivered.
    pub fn end_run(&mut self) {
        self.flush();
        self.emit(Update::RunEnded);
    }

    /// Wrapped world.
    #[must_use]
    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Sink receiving the updates.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Active delivery policy.
    #[must_use]
    pub const fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Changes waiting for the next flush.
    #[must_use]
    pub fn queued(&self) -> &[CellChange] {
        &self.queue
    }

    /// Reports whether the sink has accepted every update so far.
    #[must_use]
    pub const fn is_sink_open(&self) -> bool {
        self.sink_open
    }

    fn record(&mut self, change: CellChange) {
        match self.mode {
            StreamMode::Animated => self.emit(Update::Cell(change)),
            StreamMode::Batched { max_batch_size } => {
                self.queue.push(change);
                if self.queue.len() >= max_batch_size {
                    self.flush();
                }
            }
        }
    }

    fn emit(&mut self, update: Update) {
        if self.sink.deliver(update).is_err() && self.sink_open {
            self.sink_open = false;
            warn!("update consumer disconnected; further updates are dropped");
        }
    }
}

impl<S> CellMap for UpdateChannel<S>
where
    S: UpdateSink,
{
    fn cell(&self, position: Position) -> CellState {
        self.world.cell(position)
    }

    fn put_cell(&mut self, state: CellState, position: Position) -> CellState {
        let effective = self.world.put_cell(state, position);
        self.record(CellChange::new(effective, position));
        effective
    }

    fn clear_map(&mut self) {
        self.world.clear_map();
        if !self.queue.is_empty() {
            debug!(changes = self.queue.len(), "discarding queued changes on reset");
            self.queue.clear();
        }
        self.emit(Update::MapReset);
    }
}
