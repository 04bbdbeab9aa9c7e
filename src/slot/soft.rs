use std::future::{self, Future};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Close, Slot};
use crate::context::Context;
use crate::error::SignalError;

/// Evict-on-full: a value that does not fit is dropped for this subscriber.
///
/// Closing does not disconnect the receiver while the slot is still
/// registered; it only stops further deliveries.
pub struct SoftSlot<T> {
    tx: flume::Sender<T>,
    closed: AtomicBool,
}

impl<T> SoftSlot<T> {
    fn try_dispatch(&self, ctx: &Context, value: T) -> Result<usize, SignalError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SignalError::Closed);
        }
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        match self.tx.try_send(value) {
            Ok(()) => Ok(1),
            Err(flume::TrySendError::Full(_)) => Ok(0),
            Err(flume::TrySendError::Disconnected(_)) => {
                // Receiver dropped without closing.
                self.closed.store(true, Ordering::Release);
                Err(SignalError::Closed)
            }
        }
    }
}

impl<T: Send> Close for SoftSlot<T> {
    fn close(&self) -> Result<(), SignalError> {
        self.closed.store(true, Ordering::Release);
        tracing::trace!("soft slot closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<T: Send + 'static> Slot<T> for SoftSlot<T> {
    fn with_capacity(capacity: usize) -> (Self, flume::Receiver<T>) {
        let (tx, rx) = flume::bounded(capacity);
        let slot = Self {
            tx,
            closed: AtomicBool::new(false),
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
