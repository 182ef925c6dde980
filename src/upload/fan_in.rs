//! Fan-in of many concurrent outcomes into a single result.

use tokio::sync::oneshot;

/// What a call to [`FanIn::complete`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Still waiting for more outcomes.
    Pending,
    /// This outcome resolved the batch.
    Delivered,
    /// The batch was already resolved; the outcome was only counted.
    Ignored,
}

/// Counts down a fixed number of operations and resolves once.
///
/// The first error resolves the batch immediately. Otherwise the batch
/// resolves with `value` when the last operation succeeds. The sender and
/// the value live in one `Option` that is taken on resolution, so the
/// receiver sees at most one result.
pub struct FanIn<T, E> {
    pending: usize,
    waiting: Option<(oneshot::Sender<Result<T, E>>, T)>,
}

impl<T, E> FanIn<T, E> {
    /// Starts a batch of `pending` operations. A batch of zero resolves
    /// with `value` right away.
    pub fn new(pending: usize, value: T) -> (Self, oneshot::Receiver<Result<T, E>>) {
        let (sender, receiver) = oneshot::channel();

        let mut fan_in = Self {
            pending,
            waiting: None,
        };
        if pending == 0 {
            let _ = sender.send(Ok(value));
        } else {
            fan_in.waiting = Some((sender, value));
        }

        (fan_in, receiver)
    }

    /// Records the outcome of one operation.
    pub fn complete(&mut self, outcome: Result<(), E>) -> Delivery {
        self.pending = self.pending.saturating_sub(1);

        let Some((sender, value)) = self.waiting.take() else {
            return Delivery::Ignored;
        };

        match outcome {
            Err(e) => {
                let _ = sender.send(Err(e));
                Delivery::Delivered
            }
            Ok(()) if self.pending == 0 => {
                let _ = sender.send(Ok(value));
                Delivery::Delivered
            }
            Ok(()) => {
                self.waiting = Some((sender, value));
                Delivery::Pending
            }
        }
    }

    /// Operations not yet reported.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_resolved(&self) -> bool {
        self.waiting.is_none()
    }
}
