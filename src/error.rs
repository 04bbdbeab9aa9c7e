use thiserror::Error;

/// Failure of a single send or receive.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The slot (or channel) is closed. Absorbed by [`crate::Signal::dispatch`].
    #[error("end of stream")]
    Closed,
}

impl SignalError {
    /// Returns true if the slot or channel has been closed.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, SignalError::Closed)
    }

    /// Returns true if the caller's context fired.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SignalError::Cancelled | SignalError::DeadlineExceeded)
    }
}

/// A dispatch aborted by its context before reaching every slot.
///
/// `delivered` counts the slots that accepted the value before the abort.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("dispatch aborted after {delivered} deliveries: {cause}")]
pub struct DispatchError {
    pub delivered: usize,
    #[source]
    pub cause: SignalError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown delivery policy: {0:?}")]
pub struct ParsePolicyError(pub String);
