//! Progress handlers: the server-sent event stream and a polling snapshot.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use blueprint_events::{ProgressNotice, ProgressSnapshot};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::AppResult;
use crate::handlers::find_project;
use crate::query::ProjectIdParams;
use crate::state::AppState;

pub const LAST_EVENT_ID: &str = "last-event-id";

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/progress/stream?projectId=
///
/// Replays the project's progress log after `Last-Event-ID`, then follows
/// live events. The stream closes after the `finalizing` event or when the
/// server shuts down.
pub async fn stream(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
    headers: HeaderMap,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let project_id = params.require()?;
    find_project(&state, &project_id).await?;
    let after = last_event_id(&headers);

    // Subscribe first so nothing published during the replay is lost.
    let receiver = state.progress.subscribe();
    let replayed = state.progress.replay(&project_id, after).await;
    let replayed_up_to = replayed.last().map(|n| n.seq).or(after).unwrap_or(0);

    tracing::debug!(
        project_id = %project_id,
        after = ?after,
        replayed = replayed.len(),
        "Progress stream opened",
    );

    let live_project = project_id.clone();
    let live = BroadcastStream::new(receiver).filter_map(move |received| {
        let notice = match received {
            Ok(n) if n.project_id == live_project && n.seq > replayed_up_to => Some(n),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(project_id = %live_project, skipped, "Progress subscriber lagged");
                None
            }
        };
        future::ready(notice)
    });

    let events = stream::iter(replayed)
        .chain(live)
        // A `None` right after the final event ends the stream without
        // waiting for another notice.
        .flat_map(|notice| {
            let last = notice.event.stage.is_final();
            stream::iter([Some(notice), None].into_iter().take(if last { 2 } else { 1 }))
        })
        .take_while(|notice| future::ready(notice.is_some()))
        .filter_map(future::ready)
        .map(|notice| Ok(to_event(&notice)))
        .take_until(state.jobs.shutdown_token().cancelled_owned());

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

/// GET /api/progress?projectId=
pub async fn snapshot(
    State(state): State<AppState>,
    Query(params): Query<ProjectIdParams>,
) -> AppResult<Json<ProgressSnapshot>> {
    let project_id = params.require()?;
    find_project(&state, &project_id).await?;
    Ok(Json(state.progress.snapshot(&project_id).await))
}

fn last_event_id(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(LAST_EVENT_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn to_event(notice: &ProgressNotice) -> Event {
    let payload = json!({ "type": "progress", "event": notice.event });
    Event::default()
        .id(notice.seq.to_string())
        .data(payload.to_string())
}
