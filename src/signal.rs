//! The broadcaster: one dispatch fanned out to every live slot.
//!
//! The slot set is an immutable snapshot behind an [`ArcSwap`]. Dispatch
//! loads one snapshot and walks it without taking any lock. Subscribe builds
//! a replacement snapshot (live slots of the current one plus the new slot)
//! and publishes it with compare-and-swap, retrying from the latest snapshot
//! if another subscribe won the race. Closed slots are pruned there, never
//! removed synchronously.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::context::Context;
use crate::error::{DispatchError, SignalError};
use crate::slot::{Close, HardSlot, Slot, SoftSlot, SureSlot};

/// Broadcaster whose subscribers drop values they have no room for.
pub type SoftSignal<T> = Signal<T, SoftSlot<T>>;
/// Broadcaster that disconnects subscribers which fall behind.
pub type HardSignal<T> = Signal<T, HardSlot<T>>;
/// Broadcaster that waits for every subscriber to take each value.
pub type SureSignal<T> = Signal<T, SureSlot<T>>;

/// Creates a broadcaster that skips subscribers whose buffer is full.
pub fn soft<T: Clone + Send + 'static>() -> SoftSignal<T> {
    Signal::new()
}

/// Creates a broadcaster that closes subscribers whose buffer is full.
pub fn hard<T: Clone + Send + 'static>() -> HardSignal<T> {
    Signal::new()
}

/// Creates a broadcaster whose dispatch waits for room in every subscriber.
pub fn sure<T: Clone + Send + 'static>() -> SureSignal<T> {
    Signal::new()
}

pub fn evict_on_full<T: Clone + Send + 'static>() -> SoftSignal<T> {
    soft()
}

pub fn close_on_full<T: Clone + Send + 'static>() -> HardSignal<T> {
    hard()
}

pub fn block_on_full<T: Clone + Send + 'static>() -> SureSignal<T> {
    sure()
}

/// Fan-out of `T` values to a changing set of subscribers.
///
/// Clones share the same subscriber set.
pub struct Signal<T, S> {
    inner: Arc<Inner<T, S>>,
}

struct Inner<T, S> {
    slots: ArcSwap<Vec<Arc<S>>>,
    _value: std::marker::PhantomData<fn(T)>,
}

impl<T, S> Clone for Signal<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S> Signal<T, S>
where
    T: Clone + Send + 'static,
    S: Slot<T>,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: ArcSwap::from_pointee(Vec::new()),
                _value: std::marker::PhantomData,
            }),
        }
    }

    /// Offers `value` to every subscriber in the current snapshot.
    ///
    /// Returns how many subscribers accepted it. Closed subscribers are
    /// skipped. If `ctx` fires, the call stops at that subscriber and the
    /// remaining ones in the snapshot do not see the value; the error
    /// carries the count delivered so far.
    pub async fn dispatch(&self, ctx: &Context, value: T) -> Result<usize, DispatchError> {
        let slots = self.inner.slots.load_full();

        let mut delivered = 0;
        for slot in slots.iter() {
            match slot.dispatch(ctx, value.clone()).await {
                Ok(n) => delivered += n,
                Err(SignalError::Closed) => continue,
                Err(cause) => {
                    tracing::trace!(delivered, %cause, "dispatch aborted");
                    return Err(DispatchError { delivered, cause });
                }
            }
        }

        tracing::trace!(delivered, subscribers = slots.len(), "dispatched");
        Ok(delivered)
    }

    /// Registers a subscriber with a buffer of `capacity` values.
    ///
    /// `capacity == 0` makes every delivery a direct hand-off to a waiting
    /// receiver. Returns the receiving end and a [`Closer`] that ends the
    /// subscription.
    pub fn subscribe(&self, capacity: usize) -> (flume::Receiver<T>, Closer) {
        let (slot, rx) = S::with_capacity(capacity);
        let slot = Arc::new(slot);

        let mut retries = 0usize;
        loop {
            let current = self.inner.slots.load_full();

            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().filter(|s| !s.is_closed()).cloned());
            let pruned = current.len() - next.len();
            next.push(Arc::clone(&slot));
            let live = next.len();

            let prev = self.inner.slots.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*prev, &current) {
                tracing::debug!(capacity, live, pruned, retries, "subscribed");
                break;
            }
            retries += 1;
        }

        (rx, Closer { slot: slot as Arc<dyn Close> })
    }

    /// Number of subscribers in the current snapshot that are not closed.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .slots
            .load()
            .iter()
            .filter(|s| !s.is_closed())
            .count()
    }

    /// Number of entries in the current snapshot, including closed ones not
    /// yet pruned.
    pub fn slot_count(&self) -> usize {
        self.inner.slots.load().len()
    }
}

impl<T, S> Default for Signal<T, S>
where
    T: Clone + Send + 'static,
    S: Slot<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Ends one subscription. Clones close the same subscription.
#[derive(Clone)]
pub struct Closer {
    slot: Arc<dyn Close>,
}

impl Closer {
    /// Closes the subscription. Calling it again is a no-op.
    pub fn close(&self) -> Result<(), SignalError> {
        self.slot.close()
    }

    pub fn is_closed(&self) -> bool {
        self.slot.is_closed()
    }

    /// Returns a guard that closes the subscription when dropped.
    pub fn guard(self) -> CloseGuard {
        CloseGuard { closer: self }
    }
}

impl std::fmt::Debug for Closer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closer")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// RAII guard that closes its subscription when dropped.
#[derive(Debug)]
pub struct CloseGuard {
    closer: Closer,
}

impl CloseGuard {
    pub fn closer(&self) -> &Closer {
        &self.closer
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        let _ = self.closer.close();
    }
}
