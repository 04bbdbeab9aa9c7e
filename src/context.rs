//! Cancellation and deadlines for dispatch and receive calls.
//!
//! A [`Context`] pairs a [`CancellationToken`] with an optional deadline.
//! Every [`Signal::dispatch`](crate::Signal::dispatch) and every
//! [`recv`](crate::recv) takes one; when it fires the call returns
//! [`SignalError::Cancelled`] or [`SignalError::DeadlineExceeded`].

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SignalError;

#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that only fires when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing token, e.g. a service's shutdown token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Adds a deadline `timeout` from now. An earlier deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Adds a deadline. An earlier deadline is kept.
    pub fn with_deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current <= at => current,
            _ => at,
        });
        self
    }

    /// Derives a context cancelled together with this one, but whose own
    /// [`cancel`](Self::cancel) does not propagate upward.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: `Some` once the context has fired.
    pub fn err(&self) -> Option<SignalError> {
        if self.token.is_cancelled() {
            return Some(SignalError::Cancelled);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Some(SignalError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Waits until the context fires and returns why.
    pub async fn done(&self) -> SignalError {
        match self.deadline {
            Some(at) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => SignalError::Cancelled,
                    _ = tokio::time::sleep_until(at) => SignalError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                SignalError::Cancelled
            }
        }
    }
}
