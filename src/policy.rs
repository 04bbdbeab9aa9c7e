//! Choosing a delivery policy at runtime.
//!
//! [`Policy`] is the configuration-facing name of a slot variant. It
//! deserializes from `"soft"`, `"hard"` or `"sure"` (or the descriptive
//! `"evict_on_full"`, `"close_on_full"`, `"block_on_full"`), so a host can
//! read it from whatever config source it already has. [`AnySignal`] is built
//! from it once and then forwards every call to the typed broadcaster.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{DispatchError, ParsePolicyError};
use crate::signal::{self, Closer, HardSignal, SoftSignal, SureSignal};

/// What a broadcaster does with a subscriber whose buffer is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Drop the value for that subscriber.
    #[default]
    #[serde(alias = "evict_on_full")]
    Soft,
    /// Close that subscriber.
    #[serde(alias = "close_on_full")]
    Hard,
    /// Wait until that subscriber has room.
    #[serde(alias = "block_on_full")]
    Sure,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Soft => "soft",
            Policy::Hard => "hard",
            Policy::Sure => "sure",
        }
    }

    /// Whether a dispatch under this policy can wait on a subscriber.
    pub fn may_block(&self) -> bool {
        matches!(self, Policy::Sure)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" | "evict_on_full" => Ok(Policy::Soft),
            "hard" | "close_on_full" => Ok(Policy::Hard),
            "sure" | "block_on_full" => Ok(Policy::Sure),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// A broadcaster whose policy was picked at runtime.
pub enum AnySignal<T> {
    Soft(SoftSignal<T>),
    Hard(HardSignal<T>),
    Sure(SureSignal<T>),
}

impl<T> Clone for AnySignal<T> {
    fn clone(&self) -> Self {
        match self {
            AnySignal::Soft(s) => AnySignal::Soft(s.clone()),
            AnySignal::Hard(s) => AnySignal::Hard(s.clone()),
            AnySignal::Sure(s) => AnySignal::Sure(s.clone()),
        }
    }
}

impl<T: Clone + Send + 'static> AnySignal<T> {
    pub fn new(policy: Policy) -> Self {
        tracing::debug!(%policy, "creating signal");
        match policy {
            Policy::Soft => AnySignal::Soft(signal::soft()),
            Policy::Hard => AnySignal::Hard(signal::hard()),
            Policy::Sure => AnySignal::Sure(signal::sure()),
        }
    }

    pub fn policy(&self) -> Policy {
        match self {
            AnySignal::Soft(_) => Policy::Soft,
            AnySignal::Hard(_) => Policy::Hard,
            AnySignal::Sure(_) => Policy::Sure,
        }
    }

    /// See [`Signal::dispatch`](crate::Signal::dispatch).
    pub async fn dispatch(&self, ctx: &Context, value: T) -> Result<usize, DispatchError> {
        match self {
            AnySignal::Soft(s) => s.dispatch(ctx, value).await,
            AnySignal::Hard(s) => s.dispatch(ctx, value).await,
            AnySignal::Sure(s) => s.dispatch(ctx, value).await,
        }
    }

    /// See [`Signal::subscribe`](crate::Signal::subscribe).
    pub fn subscribe(&self, capacity: usize) -> (flume::Receiver<T>, Closer) {
        match self {
            AnySignal::Soft(s) => s.subscribe(capacity),
            AnySignal::Hard(s) => s.subscribe(capacity),
            AnySignal::Sure(s) => s.subscribe(capacity),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        match self {
            AnySignal::Soft(s) => s.subscriber_count(),
            AnySignal::Hard(s) => s.subscriber_count(),
            AnySignal::Sure(s) => s.subscriber_count(),
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            AnySignal::Soft(s) => s.slot_count(),
            AnySignal::Hard(s) => s.slot_count(),
            AnySignal::Sure(s) => s.slot_count(),
        }
    }
}

impl<T: Clone + Send + 'static> From<Policy> for AnySignal<T> {
    fn from(policy: Policy) -> Self {
        Self::new(policy)
    }
}
