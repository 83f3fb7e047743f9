//! Database row types. These map directly to SQLite rows and are converted
//! into the `fieldhand-types` records at the store boundary.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fieldhand_types::models::{Invite, Job, User, WorkerProfile};

pub struct UserRow {
    pub id: String,
    pub role: String,
    pub name: String,
    pub phone: String,
    pub language: String,
    pub rating: f64,
    pub created_at: String,
}

pub struct WorkerRow {
    pub user_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: f64,
    pub skills: String,
    pub rate: f64,
    pub available_today: bool,
    pub reliability: f64,
    pub reviews: u32,
}

pub struct JobRow {
    pub id: String,
    pub farmer_id: String,
    pub title: String,
    pub description: String,
    pub wage: f64,
    pub num_workers: u32,
    pub start_at: String,
    pub duration_hours: f64,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub status: String,
    pub created_at: String,
}

pub struct InviteRow {
    pub id: String,
    pub job_id: String,
    pub worker_id: String,
    pub status: String,
    pub created_at: String,
}

fn parse_id(raw: &str, column: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("corrupt {} '{}'", column, raw))
}

fn parse_time(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("corrupt {} '{}'", column, raw))
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id, "users.id")?,
            role: row.role.parse().map_err(anyhow::Error::msg)?,
            name: row.name,
            phone: row.phone,
            language: row.language,
            rating: row.rating,
            created_at: parse_time(&row.created_at, "users.created_at")?,
        })
    }
}

impl TryFrom<WorkerRow> for WorkerProfile {
    type Error = anyhow::Error;

    fn try_from(row: WorkerRow) -> Result<Self> {
        let skills: Vec<String> = serde_json::from_str(&row.skills)
            .with_context(|| format!("corrupt skills for worker '{}'", row.user_id))?;
        Ok(Self {
            user_id: parse_id(&row.user_id, "workers.user_id")?,
            lat: row.lat,
            lng: row.lng,
            radius_km: row.radius_km,
            skills,
            rate: row.rate,
            available_today: row.available_today,
            reliability: row.reliability,
            reviews: row.reviews,
        })
    }
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id, "jobs.id")?,
            farmer_id: parse_id(&row.farmer_id, "jobs.farmer_id")?,
            title: row.title,
            description: row.description,
            wage: row.wage,
            num_workers: row.num_workers,
            start_at: parse_time(&row.start_at, "jobs.start_at")?,
            duration_hours: row.duration_hours,
            lat: row.lat,
            lng: row.lng,
            radius_km: row.radius_km,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            created_at: parse_time(&row.created_at, "jobs.created_at")?,
        })
    }
}

impl TryFrom<InviteRow> for Invite {
    type Error = anyhow::Error;

    fn try_from(row: InviteRow) -> Result<Self> {
        Ok(Self {
            id: parse_id(&row.id, "invites.id")?,
            job_id: parse_id(&row.job_id, "invites.job_id")?,
            worker_id: parse_id(&row.worker_id, "invites.worker_id")?,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            created_at: parse_time(&row.created_at, "invites.created_at")?,
        })
    }
}
