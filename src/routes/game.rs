use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::game::{
        CaptureEventRecord, CaptureResponse, CaptureZoneRequest, GameSnapshot, JoinResponse,
        JoinTeamRequest, SelectColorRequest, ToggleReadyRequest, VoteRequest,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Routes handling room session queries and commands.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/join", post(join_team))
        .route("/rooms/{code}/color", post(select_color))
        .route("/rooms/{code}/vote", post(vote))
        .route("/rooms/{code}/ready", post(toggle_ready))
        .route("/rooms/{code}/capture", post(capture_zone))
        .route("/rooms/{code}/reset", post(reset))
        .route("/rooms/{code}/captures", get(capture_log))
}

/// Fetch the room's session snapshot, creating a default session on first
/// access.
#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Current session snapshot", body = GameSnapshot),
        (status = 400, description = "Malformed room code")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = session_service::get_or_create(&state, &code).await?;
    Ok(Json(snapshot))
}

/// Put the player on the requested team.
#[utoipa::path(
    post,
    path = "/rooms/{code}/join",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = JoinTeamRequest,
    responses(
        (status = 200, description = "Player placed on the team", body = JoinResponse),
        (status = 409, description = "Joining is blocked while the player is ready or the match left setup")
    )
)]
pub async fn join_team(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinTeamRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    payload.validate()?;
    let response = session_service::join_team(&state, &code, payload).await?;
    Ok(Json(response))
}

/// Set the team's color from the configured palette.
#[utoipa::path(
    post,
    path = "/rooms/{code}/color",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = SelectColorRequest,
    responses(
        (status = 200, description = "Color applied", body = GameSnapshot),
        (status = 409, description = "The rival team already uses that color")
    )
)]
pub async fn select_color(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<SelectColorRequest>,
) -> Result<Json<GameSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = session_service::select_color(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

/// Cast the player's match duration vote.
#[utoipa::path(
    post,
    path = "/rooms/{code}/vote",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = GameSnapshot),
        (status = 409, description = "The player already voted or is not rostered")
    )
)]
pub async fn vote(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<GameSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = session_service::vote(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

/// Toggle the player's readiness; starts the match once every rostered
/// player is ready.
#[utoipa::path(
    post,
    path = "/rooms/{code}/ready",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = ToggleReadyRequest,
    responses(
        (status = 200, description = "Readiness toggled", body = GameSnapshot),
        (status = 409, description = "The player is not rostered")
    )
)]
pub async fn toggle_ready(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<ToggleReadyRequest>,
) -> Result<Json<GameSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = session_service::toggle_ready(&state, &code, payload).await?;
    Ok(Json(snapshot))
}

/// Capture a zone for the acting player's team.
#[utoipa::path(
    post,
    path = "/rooms/{code}/capture",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    request_body = CaptureZoneRequest,
    responses(
        (status = 200, description = "Capture applied (or already owned)", body = CaptureResponse),
        (status = 404, description = "The zone reference matches no zone"),
        (status = 409, description = "The match is not running or the player is not rostered")
    )
)]
pub async fn capture_zone(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<CaptureZoneRequest>,
) -> Result<Json<CaptureResponse>, AppError> {
    payload.validate()?;
    let response = session_service::capture_zone(&state, &code, payload).await?;
    Ok(Json(response))
}

/// Reinitialize the room's session to defaults.
#[utoipa::path(
    post,
    path = "/rooms/{code}/reset",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Fresh session snapshot", body = GameSnapshot)
    )
)]
pub async fn reset(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = session_service::reset(&state, &code).await?;
    Ok(Json(snapshot))
}

/// List the room's capture audit log.
#[utoipa::path(
    get,
    path = "/rooms/{code}/captures",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code")),
    responses(
        (status = 200, description = "Capture log in chronological order", body = [CaptureEventRecord]),
        (status = 404, description = "Room was never created")
    )
)]
pub async fn capture_log(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<CaptureEventRecord>>, AppError> {
    let log = session_service::capture_log(&state, &code).await?;
    Ok(Json(log))
}
