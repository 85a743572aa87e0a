//! HTTP request handlers
//!
//! Implements the REST endpoints for the jukebox, the DJ console, and the
//! player agent callback. Fairness rejections come back as 409 with the
//! patron-facing message; unknown ids are 404; everything else is 500.

use crate::api::server::AppContext;
use crate::db::bans::BanDuration;
use crate::engine::{ActivationSource, LiveQueueSnapshot, PauseToggle, RequestOutcome};
use crate::error::Error;
use crate::queue::EntryId;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use clubcast_common::events::{ActivePlaylistInfo, NowPlaying, QueueEntryInfo};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct JukeboxRequest {
    pub song_id: i64,
    /// Opaque per-patron token, minted by the kiosk frontend
    pub requester: String,
}

#[derive(Debug, Serialize)]
pub struct EnqueuedResponse {
    status: String,
    entry: QueueEntryInfo,
}

#[derive(Debug, Deserialize)]
pub struct SongIdRequest {
    pub song_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub song_id: i64,
    /// "today", "week" or "permanent"
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct BanResponse {
    status: String,
    removed_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    status: String,
    now_playing: Option<NowPlaying>,
}

#[derive(Debug, Serialize)]
pub struct ResumedResponse {
    status: String,
    song: NowPlaying,
    position_seconds: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub entry_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    pub entry_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: i64,
}

#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct AgentAuth {
    pub secret: Option<String>,
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn error_response(e: Error) -> ApiError {
    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            error!("Request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(StatusResponse { status: format!("error: {}", e) }))
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse { status: format!("error: {}", message) }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "live_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Viewer Endpoints
// ============================================================================

/// GET /live/queue - Full queue snapshot (upcoming, history, player state)
pub async fn get_queue(State(ctx): State<AppContext>) -> Json<LiveQueueSnapshot> {
    Json(ctx.engine.live_snapshot().await)
}

/// GET /live/playlist - Currently active playlist, if any
pub async fn get_active_playlist(State(ctx): State<AppContext>) -> Json<ActivePlaylistInfo> {
    Json(ctx.engine.active_playlist().await)
}

/// POST /jukebox/request - Patron song request
///
/// 201 when accepted; 409 with the patron-facing reason when a fairness
/// rule rejects it; 404 for unknown songs.
pub async fn jukebox_request(
    State(ctx): State<AppContext>,
    Json(req): Json<JukeboxRequest>,
) -> Result<(StatusCode, Json<EnqueuedResponse>), ApiError> {
    match ctx.engine.request_song(req.song_id, req.requester).await {
        Ok(RequestOutcome::Accepted(entry)) => {
            info!(song_id = req.song_id, "Jukebox request accepted");
            Ok((
                StatusCode::CREATED,
                Json(EnqueuedResponse { status: "queued".to_string(), entry }),
            ))
        }
        Ok(RequestOutcome::Rejected(reason)) => Err((
            StatusCode::CONFLICT,
            Json(StatusResponse { status: reason.to_string() }),
        )),
        Err(e) => Err(error_response(e)),
    }
}

// ============================================================================
// DJ Console Endpoints
// ============================================================================

/// POST /dj/priority - Queue a DJ pick ahead of user requests
pub async fn dj_priority(
    State(ctx): State<AppContext>,
    Json(req): Json<SongIdRequest>,
) -> Result<(StatusCode, Json<EnqueuedResponse>), ApiError> {
    let entry = ctx
        .engine
        .add_dj_priority(req.song_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(EnqueuedResponse { status: "queued".to_string(), entry }),
    ))
}

/// POST /dj/commercial - Queue a commercial at the absolute head
pub async fn dj_commercial(
    State(ctx): State<AppContext>,
    Json(req): Json<SongIdRequest>,
) -> Result<(StatusCode, Json<EnqueuedResponse>), ApiError> {
    let entry = ctx
        .engine
        .play_commercial(req.song_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(EnqueuedResponse { status: "queued".to_string(), entry }),
    ))
}

/// POST /dj/ban - Ban a song and purge its queued entries
pub async fn dj_ban(
    State(ctx): State<AppContext>,
    Json(req): Json<BanRequest>,
) -> Result<Json<BanResponse>, ApiError> {
    let duration: BanDuration = req.duration.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(StatusResponse {
                status: format!("error: unknown ban duration '{}'", req.duration),
            }),
        )
    })?;

    let removed_entries = ctx
        .engine
        .ban_song(req.song_id, duration)
        .await
        .map_err(error_response)?;
    Ok(Json(BanResponse { status: "banned".to_string(), removed_entries }))
}

/// POST /dj/playlist/:playlist_id/activate - Load a playlist and start it
pub async fn dj_activate_playlist(
    State(ctx): State<AppContext>,
    Path(playlist_id): Path<i64>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let now_playing = ctx
        .engine
        .activate_playlist(playlist_id, ActivationSource::Dj)
        .await
        .map_err(error_response)?;

    let status = if now_playing.is_some() { "playing" } else { "empty_playlist" };
    Ok(Json(PlaybackResponse { status: status.to_string(), now_playing }))
}

/// POST /dj/play - Start playback of the queue head
pub async fn dj_play(
    State(ctx): State<AppContext>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    match ctx.engine.play_next().await.map_err(error_response)? {
        Some(now_playing) => Ok(Json(PlaybackResponse {
            status: "playing".to_string(),
            now_playing: Some(now_playing),
        })),
        None => Err(not_found("Queue is empty")),
    }
}

/// POST /dj/pause - Toggle pause/resume of the current song
pub async fn dj_pause(
    State(ctx): State<AppContext>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    match ctx.engine.toggle_pause().await.map_err(error_response)? {
        PauseToggle::Paused => {
            Ok(Json(StatusResponse { status: "paused".to_string() }).into_response())
        }
        PauseToggle::Resumed { song, position_seconds, .. } => Ok(Json(ResumedResponse {
            status: "playing".to_string(),
            song,
            position_seconds,
        })
        .into_response()),
        PauseToggle::NoSong => Err(not_found("No song loaded")),
    }
}

/// POST /dj/skip - Skip the current song, advancing to the queue head
pub async fn dj_skip(
    State(ctx): State<AppContext>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let now_playing = ctx.engine.skip().await.map_err(error_response)?;
    let status = if now_playing.is_some() { "playing" } else { "stopped" };
    Ok(Json(PlaybackResponse { status: status.to_string(), now_playing }))
}

/// POST /dj/queue/reorder - Rebuild the queue in the given entry order.
/// Entries omitted from the list are dropped.
pub async fn dj_reorder_queue(
    State(ctx): State<AppContext>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let ids: Vec<EntryId> = req.entry_ids.into_iter().map(EntryId).collect();
    ctx.engine.reorder_queue(ids).await.map_err(error_response)?;
    Ok(Json(StatusResponse { status: "reordered".to_string() }))
}

/// POST /dj/queue/promote - Move one entry to the queue head
pub async fn dj_promote_entry(
    State(ctx): State<AppContext>,
    Json(req): Json<PromoteRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let promoted = ctx
        .engine
        .promote_request(EntryId(req.entry_id))
        .await
        .map_err(error_response)?;
    if promoted {
        Ok(Json(StatusResponse { status: "promoted".to_string() }))
    } else {
        Err(not_found("Queue entry not found or already first"))
    }
}

/// POST /dj/volume - Set the master volume (clamped to 0-100)
pub async fn dj_volume(
    State(ctx): State<AppContext>,
    Json(req): Json<VolumeRequest>,
) -> Json<VolumeResponse> {
    let volume = ctx.engine.set_volume(req.volume).await;
    Json(VolumeResponse { volume })
}

// ============================================================================
// Player Agent Endpoints
// ============================================================================

/// POST /agent/song-ended - A player agent reports the media stream ended
pub async fn agent_song_ended(
    State(ctx): State<AppContext>,
    Query(auth): Query<AgentAuth>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    if !ctx.engine.config().agent_secret_matches(auth.secret.as_deref()) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(StatusResponse { status: "error: invalid agent secret".to_string() }),
        ));
    }

    let now_playing = ctx.engine.handle_song_ended().await.map_err(error_response)?;
    let status = if now_playing.is_some() { "playing" } else { "stopped" };
    Ok(Json(PlaybackResponse { status: status.to_string(), now_playing }))
}
