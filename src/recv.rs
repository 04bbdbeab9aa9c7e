use crate::context::Context;
use crate::error::SignalError;

/// Waits for the next value on `rx`, or for `ctx` to fire.
///
/// Returns `None` both when the context fires first and when the channel
/// is closed and empty. Use [`recv_checked`] to tell them apart.
pub async fn recv<T>(ctx: &Context, rx: &flume::Receiver<T>) -> Option<T> {
    recv_checked(ctx, rx).await.ok()
}

/// Like [`recv`], but reports why nothing was received.
pub async fn recv_checked<T>(ctx: &Context, rx: &flume::Receiver<T>) -> Result<T, SignalError> {
    tokio::select! {
        biased;
        err = ctx.done() => Err(err),
        res = rx.recv_async() => res.map_err(|_| SignalError::Closed),
    }
}
