use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::{Close, Slot};
use crate::context::Context;
use crate::error::SignalError;

/// Block-on-full: the dispatching task waits until the subscriber has room.
///
/// The wait ends when the value is queued, when the caller's context fires,
/// or when the slot is closed. Like [`SoftSlot`](super::SoftSlot), closing
/// does not disconnect the receiver while the slot is still registered.
pub struct SureSlot<T> {
    tx: flume::Sender<T>,
    token: CancellationToken,
}

impl<T: Send> Close for SureSlot<T> {
    fn close(&self) -> Result<(), SignalError> {
        self.token.cancel();
        tracing::trace!("sure slot closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T: Send + 'static> Slot<T> for SureSlot<T> {
    fn with_capacity(capacity: usize) -> (Self, flume::Receiver<T>) {
        let (tx, rx) = flume::bounded(capacity);
        let slot = Self {
            tx,
            token: CancellationToken::new(),
        };
        (slot, rx)
    }

    fn dispatch(
        &self,
        ctx: &Context,
        value: T,
    ) -> impl Future<Output = Result<usize, SignalError>> + Send {
        async move {
            if self.token.is_cancelled() {
                return Err(SignalError::Closed);
            }
            if let Some(err) = ctx.err() {
                return Err(err);
            }

            // The send is polled first: a receiver may already have taken the
            // value from the pending send when the context fires or the slot
            // closes, and that hand-off must be counted.
            tokio::select! {
                biased;
                sent = self.tx.send_async(value) => match sent {
                    Ok(()) => Ok(1),
                    Err(_) => {
                        // Receiver dropped without closing.
                        self.token.cancel();
                        Err(SignalError::Closed)
                    }
                },
                err = ctx.done() => Err(err),
                _ = self.token.cancelled() => Err(SignalError::Closed),
            }
        }
    }
}
