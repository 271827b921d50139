use crate::{dto::health::HealthResponse, state::SharedState};

/// Build the health payload from the current room registry.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(state.room_count())
}
