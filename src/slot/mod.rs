//! Per-subscriber delivery slots.
//!
//! A slot owns the sending half of one subscriber's channel and decides what
//! happens when that channel is full:
//!
//! | Slot         | Full buffer                              |
//! |--------------|------------------------------------------|
//! | [`SoftSlot`] | value dropped, `Ok(0)`                   |
//! | [`HardSlot`] | slot closes itself, `Err(Closed)`        |
//! | [`SureSlot`] | waits for space, the context or a close  |
//!
//! A closed slot never accepts another value, and [`Close::is_closed`] never
//! flips back to false. It is read without taking any send lock, so the
//! registry can prune closed slots while sends are in flight.

mod hard;
mod soft;
mod sure;

use std::future::Future;

pub use hard::HardSlot;
pub use soft::SoftSlot;
pub use sure::SureSlot;

use crate::context::Context;
use crate::error::SignalError;

/// The type-erased half of a slot, held by a [`Closer`](crate::Closer).
pub trait Close: Send + Sync {
    /// Closes the slot. Idempotent.
    fn close(&self) -> Result<(), SignalError>;

    fn is_closed(&self) -> bool;
}

/// A delivery policy for one subscriber.
pub trait Slot<T>: Close + Sized + 'static {
    /// Builds a slot and the receiver its subscriber reads from.
    ///
    /// `capacity == 0` gives a rendezvous channel: a value is handed over only
    /// when the receiver is already waiting for it.
    fn with_capacity(capacity: usize) -> (Self, flume::Receiver<T>);

    /// Offers `value` to the subscriber.
    ///
    /// Returns `Ok(1)` when the value was queued, `Ok(0)` when the policy
    /// dropped it, `Err(Closed)` when the slot is closed and a context error
    /// when `ctx` fired first.
    fn dispatch(
        &self,
        ctx: &Context,
        value: T,
    ) -> impl Future<Output = Result<usize, SignalError>> + Send;
}
