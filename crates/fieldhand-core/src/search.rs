//! Proximity search: filter candidates by great-circle distance and
//! predicates, rank by distance, cap the result.

use fieldhand_types::api::{NearbyJobsParams, NearbyWorkersParams};
use fieldhand_types::models::{GeoPoint, Job, JobStatus, WorkerProfile};

use crate::error::EngineError;
use crate::geo::distance_km;

/// Upper bound on results returned by any search.
pub const MAX_RESULTS: usize = 50;

/// Radius applied when the caller gives none (or an unusable one).
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// A candidate paired with its full-precision distance from the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a, T> {
    pub item: &'a T,
    pub distance_km: f64,
}

impl<T> Ranked<'_, T> {
    /// Distance rounded to two decimals, for presentation only.
    pub fn display_distance(&self) -> f64 {
        round_km(self.distance_km)
    }
}

pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerQuery {
    pub origin: GeoPoint,
    pub radius_km: f64,
    /// Every listed skill must be present; compared case-insensitively.
    pub skills: Vec<String>,
    pub min_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub only_available: bool,
}

impl WorkerQuery {
    pub fn near(origin: GeoPoint, radius_km: f64) -> Self {
        Self {
            origin,
            radius_km,
            skills: Vec::new(),
            min_rate: None,
            max_rate: None,
            only_available: false,
        }
    }

    pub fn from_params(params: &NearbyWorkersParams) -> Result<Self, EngineError> {
        let origin = parse_origin(params.lat.as_deref(), params.lng.as_deref())?;
        let radius_km = parse_radius(params.radius.as_deref())?;

        let skills = params
            .skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let only_available = match params.only_available.as_deref().map(str::trim) {
            None | Some("") | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(EngineError::invalid(format!(
                    "onlyAvailable must be true or false, got '{}'",
                    other
                )));
            }
        };

        Ok(Self {
            origin,
            radius_km,
            skills,
            min_rate: parse_bound("minRate", params.min_rate.as_deref())?,
            max_rate: parse_bound("maxRate", params.max_rate.as_deref())?,
            only_available,
        })
    }

    fn admits(&self, worker: &WorkerProfile, wanted_skills: &[String]) -> bool {
        if !wanted_skills.is_empty() {
            let held: Vec<String> = worker.skills.iter().map(|s| s.to_lowercase()).collect();
            if !wanted_skills.iter().all(|s| held.contains(s)) {
                return false;
            }
        }
        if self.min_rate.is_some_and(|min| worker.rate < min) {
            return false;
        }
        if self.max_rate.is_some_and(|max| worker.rate > max) {
            return false;
        }
        !self.only_available || worker.available_today
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobQuery {
    pub origin: GeoPoint,
    pub radius_km: f64,
}

impl JobQuery {
    pub fn from_params(params: &NearbyJobsParams) -> Result<Self, EngineError> {
        Ok(Self {
            origin: parse_origin(params.lat.as_deref(), params.lng.as_deref())?,
            radius_km: parse_radius(params.radius.as_deref())?,
        })
    }
}

/// Workers within `query.radius_km` of the query point that pass every
/// filter, nearest first, at most [`MAX_RESULTS`].
pub fn search_workers<'a>(
    query: &WorkerQuery,
    candidates: &'a [WorkerProfile],
) -> Result<Vec<Ranked<'a, WorkerProfile>>, EngineError> {
    check_bounds(query.origin, query.radius_km)?;

    let wanted_skills: Vec<String> = query.skills.iter().map(|s| s.to_lowercase()).collect();

    let hits = candidates
        .iter()
        .filter_map(|worker| {
            let location = worker.location()?;
            let distance_km = distance_km(query.origin, location);
            (distance_km <= query.radius_km).then_some(Ranked {
                item: worker,
                distance_km,
            })
        })
        .filter(|hit| query.admits(hit.item, &wanted_skills))
        .collect();

    Ok(rank(hits))
}

/// Open jobs within `query.radius_km` of the query point, nearest first, at
/// most [`MAX_RESULTS`].
pub fn search_jobs<'a>(
    query: &JobQuery,
    candidates: &'a [Job],
) -> Result<Vec<Ranked<'a, Job>>, EngineError> {
    check_bounds(query.origin, query.radius_km)?;

    let hits = candidates
        .iter()
        .filter(|job| job.status == JobStatus::Open)
        .filter(|job| job.location().is_finite())
        .filter_map(|job| {
            let distance_km = distance_km(query.origin, job.location());
            (distance_km <= query.radius_km).then_some(Ranked {
                item: job,
                distance_km,
            })
        })
        .collect();

    Ok(rank(hits))
}

/// Workers a newly posted job should alert: inside the job's own radius,
/// no other predicates.
pub fn workers_in_reach<'a>(
    job: &Job,
    candidates: &'a [WorkerProfile],
) -> Result<Vec<Ranked<'a, WorkerProfile>>, EngineError> {
    search_workers(&WorkerQuery::near(job.location(), job.radius_km), candidates)
}

// Vec::sort_by is stable, so ties keep insertion order.
fn rank<T>(mut hits: Vec<Ranked<'_, T>>) -> Vec<Ranked<'_, T>> {
    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hits.truncate(MAX_RESULTS);
    hits
}

fn check_bounds(origin: GeoPoint, radius_km: f64) -> Result<(), EngineError> {
    if !origin.is_finite() {
        return Err(EngineError::invalid("lat,lng must be finite numbers"));
    }
    if radius_km.is_nan() || radius_km < 0.0 {
        return Err(EngineError::invalid("radius must be a non-negative number"));
    }
    Ok(())
}

fn parse_origin(lat: Option<&str>, lng: Option<&str>) -> Result<GeoPoint, EngineError> {
    let parse = |raw: Option<&str>| {
        raw.and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| EngineError::invalid("lat,lng required"))
    };
    Ok(GeoPoint::new(parse(lat)?, parse(lng)?))
}

/// Missing, unparseable, NaN or zero radius falls back to the default.
fn parse_radius(raw: Option<&str>) -> Result<f64, EngineError> {
    let radius = raw
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan() && *v != 0.0)
        .unwrap_or(DEFAULT_RADIUS_KM);

    if radius < 0.0 {
        return Err(EngineError::invalid("radius must not be negative"));
    }
    Ok(radius)
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<f64>, EngineError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| EngineError::invalid(format!("{} must be a number, got '{}'", name, value))),
    }
}
