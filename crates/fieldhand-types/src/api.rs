use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Invite, Job, Role, User, WorkerProfile};

// -- Token Claims --

/// Bearer-token claims shared by the REST middleware and the event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct OtpStartRequest {
    pub phone: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStartResponse {
    pub request_id: Uuid,
    /// Returned in the clear; no SMS gateway is wired in.
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub role: Role,
    pub otp: String,
    pub name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

// -- Worker profile --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpsertRequest {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub skills: Option<Vec<String>>,
    pub rate: Option<f64>,
    pub available_today: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub worker: WorkerProfile,
}

// -- Search --

/// Raw query string for `GET /api/workers/nearby`. Values stay textual so
/// malformed numbers can be reported instead of rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyWorkersParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub skills: Option<String>,
    pub min_rate: Option<String>,
    pub max_rate: Option<String>,
    pub only_available: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbyJobsParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyWorker {
    pub user_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub distance_km: f64,
    pub rate: f64,
    pub skills: Vec<String>,
    pub available_today: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyJob {
    #[serde(flatten)]
    pub job: Job,
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for SearchResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

// -- Jobs --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub wage: Option<f64>,
    pub num_workers: Option<u32>,
    pub start_at: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

// -- Invites --

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub invite: Invite,
}
