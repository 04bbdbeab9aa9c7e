use std::future::{self, Future};

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use super::{Close, Slot};
use crate::context::Context;
use crate::error::SignalError;

/// Drop-and-close-on-full: a subscriber that cannot keep up is disconnected.
///
/// Sends hold the shared side of `tx`; closing takes the exclusive side and
/// drops the sender, which disconnects the receiver once it has drained the
/// values already queued. `token` is cancelled first on overflow, so a send
/// racing the close sees it before the lock changes hands.
pub struct HardSlot<T> {
    tx: RwLock<Option<flume::Sender<T>>>,
    token: CancellationToken,
}

impl<T> HardSlot<T> {
    fn try_dispatch(&self, ctx: &Context, value: T) -> Result<usize, SignalError> {
        {
            let guard = self.tx.read();
            let Some(tx) = guard.as_ref() else {
                return Err(SignalError::Closed);
            };
            if self.token.is_cancelled() {
                return Err(SignalError::Closed);
            }
            if let Some(err) = ctx.err() {
                return Err(err);
            }

            match tx.try_send(value) {
                Ok(()) => return Ok(1),
                Err(flume::TrySendError::Full(_)) => {
                    tracing::debug!(capacity = ?tx.capacity(), "subscriber overflowed, closing slot");
                }
                Err(flume::TrySendError::Disconnected(_)) => {
                    tracing::trace!("receiver dropped, closing slot");
                }
            }
            self.token.cancel();
        }

        // The shared guard is released; close needs the exclusive side.
        self.close_channel();
        Err(SignalError::Closed)
    }

    fn close_channel(&self) {
        if self.tx.write().take().is_some() {
            tracing::trace!("hard slot closed");
        }
    }
}

impl<T: Send> Close for HardSlot<T> {
    fn close(&self) -> Result<(), SignalError> {
        self.token.cancel();
        self.close_channel();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T: Send + 'static> Slot<T> for HardSlot<T> {
    fn with_capacity(capacity: usize) -> (Self, flume::Receiver<T>) {
        let (tx, rx) = flume::bounded(capacity);
        let slot = Self {
            tx: RwLock::new(Some(tx)),
            token: CancellationToken::new(),
        };
        (slot, rx)
    }

    fn dispatch(
        &self,
        ctx: &Context,
        value: T,
    ) -> impl Future<Output = Result<usize, SignalError>> + Send {
        future::ready(self.try_dispatch(ctx, value))
    }
}
