//! Resumable subscription to a project's progress stream.
//!
//! [`ProgressSubscription::follow`] reads the server-sent event stream,
//! folds events into a [`ProgressTracker`] and returns once the
//! `finalizing` event arrives. A dropped connection is reopened with
//! exponential backoff and resumes after the last event id seen, so events
//! replayed by the server are applied only once. A non-success response or
//! running out of reconnect attempts ends the subscription with an error.

use std::time::Duration;

use blueprint_core::progress::{ProgressEvent, ProgressTracker};
use blueprint_core::retry::RetryPolicy;
use blueprint_core::types::EntityId;
use futures::StreamExt;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::sse::{SseDecoder, SseMessage};

/// Reconnect attempts before the subscription gives up.
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;

/// A progress event together with its stream sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub seq: u64,
    pub event: ProgressEvent,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    event: ProgressEvent,
}

enum Outcome {
    Finished,
    Closed,
}

pub struct ProgressSubscription {
    api: ApiClient,
    project_id: EntityId,
    reconnect: RetryPolicy,
    cancel: CancellationToken,
    last_event_id: Option<u64>,
    tracker: ProgressTracker,
}

impl ProgressSubscription {
    pub fn new(api: ApiClient, project_id: impl Into<EntityId>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            reconnect: RetryPolicy::exponential(
                DEFAULT_RECONNECT_ATTEMPTS,
                Duration::from_millis(500),
                Duration::from_secs(10),
            ),
            cancel: CancellationToken::new(),
            last_event_id: None,
            tracker: ProgressTracker::new(),
        }
    }

    pub fn with_reconnect_policy(mut self, policy: RetryPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Use `cancel` instead of the subscription's own token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Skip events up to and including `seq`.
    pub fn resume_after(mut self, seq: u64) -> Self {
        self.last_event_id = Some(seq);
        self
    }

    /// Token that stops [`Self::follow`] when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn last_event_id(&self) -> Option<u64> {
        self.last_event_id
    }

    /// Follow the stream until the final stage, calling `on_update` for
    /// every newly accepted event.
    pub async fn follow<F>(&mut self, mut on_update: F) -> ClientResult<()>
    where
        F: FnMut(&ProgressUpdate, &ProgressTracker),
    {
        let mut failures = 0u32;

        loop {
            let seen_before = self.last_event_id;
            let reason = match self.connect_once(&mut on_update).await {
                Ok(Outcome::Finished) => return Ok(()),
                Ok(Outcome::Closed) => "stream closed before the plan was finalized".to_string(),
                Err(e @ (ClientError::Api { .. } | ClientError::Cancelled)) => return Err(e),
                Err(e) => e.to_string(),
            };

            // Only consecutive fruitless connections count against the budget.
            if self.last_event_id != seen_before {
                failures = 0;
            }
            failures += 1;

            let Some(delay) = self.reconnect.delay_after(failures) else {
                tracing::error!(
                    project_id = %self.project_id,
                    attempts = failures,
                    reason = %reason,
                    "Progress stream reconnects exhausted",
                );
                return Err(ClientError::Stream(format!(
                    "gave up after {failures} attempts: {reason}"
                )));
            };
            tracing::warn!(
                project_id = %self.project_id,
                attempt = failures,
                delay_ms = delay.as_millis() as u64,
                last_event_id = ?self.last_event_id,
                reason = %reason,
                "Progress stream dropped, reconnecting",
            );

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn connect_once<F>(&mut self, on_update: &mut F) -> ClientResult<Outcome>
    where
        F: FnMut(&ProgressUpdate, &ProgressTracker),
    {
        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
            response = self.api.open_progress_stream(&self.project_id, self.last_event_id) => response?,
        };
        tracing::debug!(
            project_id = %self.project_id,
            after = ?self.last_event_id,
            "Progress stream connected",
        );

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        loop {
            let chunk = tokio::select! {
                _ = self.cancel.cancelled() => return Err(ClientError::Cancelled),
                chunk = body.next() => chunk,
            };
            let Some(chunk) = chunk else {
                return Ok(Outcome::Closed);
            };
            for message in decoder.feed(&chunk?) {
                if let Some(update) = self.accept(message)? {
                    on_update(&update, &self.tracker);
                    if update.event.stage.is_final() {
                        return Ok(Outcome::Finished);
                    }
                }
            }
        }
    }

    /// Apply one SSE message. Returns the update when it is new.
    fn accept(&mut self, message: SseMessage) -> ClientResult<Option<ProgressUpdate>> {
        let seq = message.id.as_deref().and_then(|id| id.trim().parse::<u64>().ok());
        if let (Some(seq), Some(last)) = (seq, self.last_event_id) {
            if seq <= last {
                return Ok(None);
            }
        }

        let envelope: Envelope = serde_json::from_str(&message.data)?;
        if envelope.kind != "progress" {
            return Ok(None);
        }
        if let Some(seq) = seq {
            self.last_event_id = Some(seq);
        }

        if let Err(e) = self.tracker.record(envelope.event.clone()) {
            tracing::warn!(project_id = %self.project_id, error = %e, "Ignoring out-of-order progress event");
            return Ok(None);
        }
        Ok(Some(ProgressUpdate {
            seq: seq.unwrap_or_default(),
            event: envelope.event,
        }))
    }
}
