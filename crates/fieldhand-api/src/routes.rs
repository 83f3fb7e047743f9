use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, events, invites, jobs, workers};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/otp/start", post(auth::otp_start))
        .route("/api/auth/otp/verify", post(auth::otp_verify))
        .route("/api/workers/nearby", get(workers::nearby_workers))
        .route("/api/jobs/nearby", get(jobs::nearby_jobs))
        .route("/api/events", get(events::event_stream));

    let protected_routes = Router::new()
        .route("/api/me", get(auth::me))
        .route("/api/workers/me/profile", post(workers::upsert_profile))
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/{job_id}/invite/{worker_id}", post(jobs::invite_worker))
        .route("/api/invites/{invite_id}", get(invites::get_invite))
        .route("/api/invites/{invite_id}/accept", post(invites::accept_invite))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
