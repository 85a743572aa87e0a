//! Server-Sent Events push channel
//!
//! Two streams: `/events` for viewers (media references stripped) and
//! `/agent/events` for authenticated player agents (full payloads). Every
//! new connection receives the current queue state as its first event so
//! clients never render from nothing.

use crate::api::handlers::{AgentAuth, StatusResponse};
use crate::api::server::AppContext;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use clubcast_common::events::ClubEvent;
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// GET /events - viewer SSE stream
pub async fn viewer_events(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New viewer SSE client connected");

    // Subscribe before snapshotting so no update falls in between
    let rx = ctx.engine.broadcaster().subscribe_viewers();
    let initial = ctx.engine.queue_updated_event().await.display_only();

    Sse::new(event_stream(initial, rx)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

/// GET /agent/events - player agent SSE stream, shared-secret gated
pub async fn agent_events(
    State(ctx): State<AppContext>,
    Query(auth): Query<AgentAuth>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<StatusResponse>)>
{
    if !ctx.engine.config().agent_secret_matches(auth.secret.as_deref()) {
        warn!("Agent SSE connection rejected: invalid secret");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(StatusResponse { status: "error: invalid agent secret".to_string() }),
        ));
    }
    debug!("New agent SSE client connected");

    let rx = ctx.engine.broadcaster().subscribe_agents();
    let initial = ctx.engine.queue_updated_event().await;

    Ok(Sse::new(event_stream(initial, rx)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    ))
}

/// Initial snapshot followed by the live broadcast feed
fn event_stream(
    initial: ClubEvent,
    rx: tokio::sync::broadcast::Receiver<ClubEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        if let Some(event) = encode(&initial) {
            yield Ok(event);
        }

        let mut updates = BroadcastStream::new(rx);
        while let Some(result) = updates.next().await {
            match result {
                Ok(club_event) => {
                    if let Some(event) = encode(&club_event) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    // Lagged receiver: drop the missed events, the next
                    // QueueUpdated resynchronizes the client
                    warn!("SSE stream error: {:?}", e);
                }
            }
        }
    }
}

fn encode(event: &ClubEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_name()).data(json)),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
