//! Suspension points used to animate a running search.

use std::{thread, time::Duration};

/// Suspends the search between visible steps.
pub trait Pacer {
    /// Blocks for `delay` before the next step proceeds.
    fn pause(&mut self, delay: Duration);
}

/// Sleeps the current thread for the requested delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Never blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pause(&mut self, _delay: Duration) {}
}

/// Records every requested pause instead of blocking.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingPacer {
    pauses: Vec<Duration>,
}

#[cfg(test)]
impl RecordingPacer {
    pub(crate) fn pauses(&self) -> &[Duration] {
        &self.pauses
    }
}

#[cfg(test)]
impl Pacer for RecordingPacer {
    fn pause(&mut self, delay: Duration) {
        self.pauses.push(delay);
    }
}
