use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the marketplace a user acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Self::Farmer),
            "worker" => Ok(Self::Worker),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub phone: String,
    pub language: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Worker-side matching data, one per user with the `worker` role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    pub user_id: Uuid,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: f64,
    pub skills: Vec<String>,
    pub rate: f64,
    pub available_today: bool,
    pub reliability: f64,
    pub reviews: u32,
}

impl WorkerProfile {
    pub const DEFAULT_RADIUS_KM: f64 = 5.0;

    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            lat: None,
            lng: None,
            radius_km: Self::DEFAULT_RADIUS_KM,
            skills: Vec::new(),
            rate: 0.0,
            available_today: false,
            reliability: 0.0,
            reviews: 0,
        }
    }

    /// The profile's coordinate, or `None` while either half is unset or non-finite.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)).filter(GeoPoint::is_finite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Filled,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Filled => "filled",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "filled" => Ok(Self::Filled),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub title: String,
    pub description: String,
    pub wage: f64,
    pub num_workers: u32,
    pub start_at: DateTime<Utc>,
    pub duration_hours: f64,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Invited,
    Accepted,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Accepted => "accepted",
        }
    }
}

impl FromStr for InviteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(Self::Invited),
            "accepted" => Ok(Self::Accepted),
            other => Err(format!("unknown invite status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: Uuid,
    pub job_id: Uuid,
    pub worker_id: Uuid,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything the record store holds, loaded and saved as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub workers: Vec<WorkerProfile>,
    pub jobs: Vec<Job>,
    pub invites: Vec<Invite>,
}

impl Snapshot {
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn user_by_phone_mut(&mut self, phone: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.phone == phone)
    }

    pub fn worker(&self, user_id: Uuid) -> Option<&WorkerProfile> {
        self.workers.iter().find(|w| w.user_id == user_id)
    }

    pub fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn invite(&self, id: Uuid) -> Option<&Invite> {
        self.invites.iter().find(|i| i.id == id)
    }

    pub fn invite_mut(&mut self, id: Uuid) -> Option<&mut Invite> {
        self.invites.iter_mut().find(|i| i.id == id)
    }
}
