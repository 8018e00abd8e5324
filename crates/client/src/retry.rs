//! Bounded polling driven by a [`RetryPolicy`].

use std::future::Future;

use blueprint_core::retry::RetryPolicy;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

/// Call `attempt` until it yields `Some`, sleeping between tries as `policy`
/// dictates.
///
/// `attempt` receives the 1-based attempt number. `Ok(None)` means "not
/// ready yet"; an `Err` ends the poll immediately. Running out of attempts
/// gives [`ClientError::TimedOut`] naming `what`.
pub async fn poll_until<T, F, Fut>(
    policy: &RetryPolicy,
    what: &'static str,
    cancel: &CancellationToken,
    mut attempt: F,
) -> ClientResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ClientResult<Option<T>>>,
{
    let mut number = 0u32;
    loop {
        number += 1;
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        if let Some(value) = attempt(number).await? {
            return Ok(value);
        }

        let Some(delay) = policy.delay_after(number) else {
            tracing::warn!(what, attempts = number, "Polling gave up");
            return Err(ClientError::TimedOut {
                what,
                attempts: number,
            });
        };
        tracing::debug!(what, attempt = number, delay_ms = delay.as_millis() as u64, "Not ready, polling again");

        tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
