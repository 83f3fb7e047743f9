use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::info;

use fieldhand_core::EngineError;
use fieldhand_core::invites::create_invite;
use fieldhand_core::jobs::post_job;
use fieldhand_core::search::{JobQuery, search_jobs};
use fieldhand_types::api::{
    Claims, CreateJobRequest, InviteResponse, JobResponse, NearbyJob, NearbyJobsParams, SearchResponse,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, parse_id};
use crate::state::{AppState, run_blocking};

/// POST /api/jobs: post a job and alert nearby workers.
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateJobRequest>,
) -> ApiResult<Json<JobResponse>> {
    let job = run_blocking(move || {
        let dispatcher = state.dispatcher.clone();
        state
            .ledger
            .commit(
                |snap| post_job(snap, claims.sub, &req),
                |snap, job| {
                    dispatcher.job_created(job, &snap.workers);
                },
            )
            .map_err(ApiError::from)
    })
    .await?;

    info!("Job {} posted by {}", job.id, job.farmer_id);
    Ok(Json(JobResponse { job }))
}

/// GET /api/jobs/nearby
pub async fn nearby_jobs(
    State(state): State<AppState>,
    Query(params): Query<NearbyJobsParams>,
) -> ApiResult<Json<SearchResponse<NearbyJob>>> {
    let query = JobQuery::from_params(&params)?;

    let results = run_blocking(move || {
        state
            .ledger
            .read(|snap| {
                let hits = search_jobs(&query, &snap.jobs)?;
                Ok::<_, EngineError>(
                    hits.into_iter()
                        .map(|hit| NearbyJob {
                            job: hit.item.clone(),
                            distance_km: hit.display_distance(),
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(results.into()))
}

/// POST /api/jobs/{job_id}/invite/{worker_id}
pub async fn invite_worker(
    State(state): State<AppState>,
    Path((job_id, worker_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<InviteResponse>> {
    let job_id = parse_id("Job", &job_id)?;
    let worker_id = parse_id("Worker", &worker_id)?;

    let invite = run_blocking(move || {
        let dispatcher = state.dispatcher.clone();
        state
            .ledger
            .commit(
                |snap| create_invite(snap, claims.sub, job_id, worker_id),
                |snap, invite| {
                    if let Some(job) = snap.job(invite.job_id) {
                        dispatcher.invite_created(invite, job);
                    }
                },
            )
            .map_err(ApiError::from)
    })
    .await?;

    info!("Invite {} sent for job {} to worker {}", invite.id, job_id, worker_id);
    Ok(Json(InviteResponse { invite }))
}
