use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status, always `ok` (sessions are in-memory, there is no
    /// backend dependency to degrade on).
    pub status: String,
    /// Number of rooms currently registered.
    pub active_rooms: usize,
}

impl HealthResponse {
    /// Create a health response for the given room count.
    pub fn ok(active_rooms: usize) -> Self {
        Self {
            status: "ok".to_string(),
            active_rooms,
        }
    }
}
