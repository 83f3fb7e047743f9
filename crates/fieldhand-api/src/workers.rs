use axum::{
    Extension, Json,
    extract::{Query, State},
};

use fieldhand_core::EngineError;
use fieldhand_core::profiles::upsert_profile as apply_upsert;
use fieldhand_core::search::{WorkerQuery, search_workers};
use fieldhand_types::api::{
    Claims, NearbyWorker, NearbyWorkersParams, ProfileResponse, ProfileUpsertRequest, SearchResponse,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

/// POST /api/workers/me/profile
pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ProfileUpsertRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let (user, worker) = run_blocking(move || {
        state
            .ledger
            .commit(|snap| apply_upsert(snap, claims.sub, &req), |_, _| {})
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(ProfileResponse { user, worker }))
}

/// GET /api/workers/nearby
pub async fn nearby_workers(
    State(state): State<AppState>,
    Query(params): Query<NearbyWorkersParams>,
) -> ApiResult<Json<SearchResponse<NearbyWorker>>> {
    let query = WorkerQuery::from_params(&params)?;

    let results = run_blocking(move || {
        state
            .ledger
            .read(|snap| {
                let hits = search_workers(&query, &snap.workers)?;
                Ok::<_, EngineError>(
                    hits.into_iter()
                        .map(|hit| {
                            let user = snap.user(hit.item.user_id);
                            NearbyWorker {
                                user_id: hit.item.user_id,
                                name: user
                                    .map(|u| u.name.clone())
                                    .filter(|n| !n.is_empty())
                                    .unwrap_or_else(|| "Worker".to_string()),
                                phone: user.map(|u| u.phone.clone()),
                                distance_km: hit.display_distance(),
                                rate: hit.item.rate,
                                skills: hit.item.skills.clone(),
                                available_today: hit.item.available_today,
                            }
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(results.into()))
}
