//! Destinations that receive the producer's update stream.

use crossbeam_channel::Sender;
use pathviz_core::Update;
use thiserror::Error;

/// Raised when the consumer behind a sink has gone away.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("update consumer disconnected")]
pub struct SinkClosed;

/// Receives updates in emission order.
pub trait UpdateSink {
    /// Delivers one update to the consumer.
    fn deliver(&mut self, update: Update) -> Result<(), SinkClosed>;
}

impl UpdateSink for Vec<Update> {
    fn deliver(&mut self, update: Update) -> Result<(), SinkClosed> {
        self.push(update);
        Ok(())
    }
}

impl UpdateSink for Sender<Update> {
    fn deliver(&mut self, update: Update) -> Result<(), SinkClosed> {
        Sender::send(self, update).map_err(|_| SinkClosed)
    }
}

impl<S> UpdateSink for &mut S
where
    S: UpdateSink + ?Sized,
{
    fn deliver(&mut self, update: Update) -> Result<(), SinkClosed> {
        (**self).deliver(update)
    }
}
