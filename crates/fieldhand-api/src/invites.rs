use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use fieldhand_core::invites::{accept_invite as apply_accept, view_invite};
use fieldhand_types::api::{Claims, InviteResponse};

use crate::error::{ApiError, ApiResult};
use crate::extract::parse_id;
use crate::state::{AppState, run_blocking};

/// POST /api/invites/{invite_id}/accept. The farmer is told only on the
/// first acceptance.
pub async fn accept_invite(
    State(state): State<AppState>,
    Path(invite_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<InviteResponse>> {
    let invite_id = parse_id("Invite", &invite_id)?;

    let acceptance = run_blocking(move || {
        let dispatcher = state.dispatcher.clone();
        state
            .ledger
            .commit(
                |snap| apply_accept(snap, claims.sub, invite_id),
                |_, acceptance| {
                    if acceptance.transitioned {
                        dispatcher.invite_accepted(acceptance);
                    }
                },
            )
            .map_err(ApiError::from)
    })
    .await?;

    if acceptance.transitioned {
        info!("Invite {} accepted by {}", invite_id, claims.sub);
    }
    Ok(Json(InviteResponse {
        invite: acceptance.invite,
    }))
}

/// GET /api/invites/{invite_id}
pub async fn get_invite(
    State(state): State<AppState>,
    Path(invite_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<InviteResponse>> {
    let invite_id = parse_id("Invite", &invite_id)?;

    let invite = run_blocking(move || {
        state
            .ledger
            .read(|snap| view_invite(snap, claims.sub, invite_id))
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(InviteResponse { invite }))
}
