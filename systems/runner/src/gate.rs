//! Single-flight gate that admits one run at a time.

use std::sync::Arc;

use parking_lot::Mutex;

/// Occupancy of the producer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// No run is in flight; the next request is accepted.
    #[default]
    Idle,
    /// A run is in flight; requests are dropped.
    Running,
}

/// Shared handle to the producer's [`RunState`].
#[derive(Clone, Debug, Default)]
pub struct RunGate {
    state: Arc<Mutex<RunState>>,
}

impl RunGate {
    /// Creates an idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the gate to [`RunState::Running`] unless it already is.
    ///
    /// The returned permit restores [`RunState::Idle`] when dropped.
    #[must_use]
    pub fn try_acquire(&self) -> Option<RunPermit> {
        let mut state = self.state.lock();
        match *state {
            RunState::Running => None,
            RunState::Idle => {
                *state = RunState::Running;
                Some(RunPermit {
                    state: Arc::clone(&self.state),
                })
            }
        }
    }

    /// Current occupancy.
    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state.lock()
    }
}

/// Proof that the holder owns the single run slot.
#[derive(Debug)]
pub struct RunPermit {
    state: Arc<Mutex<RunState>>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        *self.state.lock() = RunState::Idle;
    }
}
