//! In-process broadcast with per-subscriber backpressure.
//!
//! A [`Signal`] fans each dispatched value out to every current subscriber.
//! Subscribers come and go at any time; each reads from its own bounded
//! channel at its own pace. What happens when a subscriber's channel is full
//! depends on the slot type the signal was built with:
//!
//! - [`soft`]: the value is dropped for that subscriber.
//! - [`hard`]: that subscriber is disconnected.
//! - [`sure`]: the dispatch waits until there is room, the [`Context`] fires,
//!   or the subscriber closes.
//!
//! ```
//! use sluice::{recv, sure, Context, DispatchError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DispatchError> {
//!     let signal = sure::<u32>();
//!     let (rx, closer) = signal.subscribe(16);
//!     let _guard = closer.guard();
//!
//!     let delivered = signal.dispatch(&Context::new(), 42).await?;
//!     assert_eq!(delivered, 1);
//!     assert_eq!(recv(&Context::new(), &rx).await, Some(42));
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod policy;
pub mod recv;
pub mod signal;
pub mod slot;

pub use context::Context;
pub use error::{DispatchError, ParsePolicyError, SignalError};
pub use policy::{AnySignal, Policy};
pub use recv::{recv, recv_checked};
pub use signal::{
    block_on_full, close_on_full, evict_on_full, hard, soft, sure, CloseGuard, Closer, HardSignal,
    Signal, SoftSignal, SureSignal,
};
pub use slot::{Close, HardSlot, Slot, SoftSlot, SureSlot};
