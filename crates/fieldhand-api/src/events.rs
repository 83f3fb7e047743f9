use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use fieldhand_gateway::stream;

use crate::auth::verify_token;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Browsers' EventSource cannot set headers, so the token rides in the query.
    pub token: Option<String>,
}

/// GET /api/events: notification stream for the token's user.
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<impl IntoResponse> {
    let token = query.token.ok_or(ApiError::Unauthorized)?;
    let claims = verify_token(&state.settings.jwt_secret, &token)?;

    let subscription = state
        .dispatcher
        .registry()
        .open(claims.sub, state.settings.channel_capacity);

    Ok(stream::sse(subscription, state.settings.heartbeat))
}
