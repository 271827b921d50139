use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Splat Tag Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::get_room,
        crate::routes::game::join_team,
        crate::routes::game::select_color,
        crate::routes::game::vote,
        crate::routes::game::toggle_ready,
        crate::routes::game::capture_zone,
        crate::routes::game::reset,
        crate::routes::game::capture_log,
        crate::routes::sse::room_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::PlayerInput,
            crate::dto::game::JoinTeamRequest,
            crate::dto::game::SelectColorRequest,
            crate::dto::game::VoteRequest,
            crate::dto::game::ToggleReadyRequest,
            crate::dto::game::CaptureZoneRequest,
            crate::dto::game::GameSnapshot,
            crate::dto::game::GameStatusDto,
            crate::dto::game::WinnerDto,
            crate::dto::game::PlayerSnapshot,
            crate::dto::game::TeamSnapshot,
            crate::dto::game::TeamsSnapshot,
            crate::dto::game::ZoneSnapshot,
            crate::dto::game::VotesSnapshot,
            crate::dto::game::TeamTallySnapshot,
            crate::dto::game::CaptureStatsSnapshot,
            crate::dto::game::JoinResponse,
            crate::dto::game::CaptureResponse,
            crate::dto::game::CaptureEventRecord,
            crate::dto::sse::CaptureNotice,
            crate::dto::sse::FinishCause,
            crate::dto::sse::SessionFinished,
            crate::state::game::TeamId,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Game session commands"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
