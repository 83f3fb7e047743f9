use chrono::Utc;
use uuid::Uuid;

use fieldhand_types::api::CreateJobRequest;
use fieldhand_types::models::{Job, JobStatus, Role, Snapshot};

use crate::accounts::require_role;
use crate::error::EngineError;
use crate::search::DEFAULT_RADIUS_KM;

const DEFAULT_TITLE: &str = "Farm work";
const DEFAULT_DURATION_HOURS: f64 = 8.0;

/// Post a new open job owned by `actor`.
pub fn post_job(snapshot: &mut Snapshot, actor: Uuid, req: &CreateJobRequest) -> Result<Job, EngineError> {
    require_role(snapshot, actor, Role::Farmer)?;

    let (lat, lng) = match (req.lat, req.lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
        _ => return Err(EngineError::invalid("lat,lng required")),
    };

    let wage = req.wage.unwrap_or(0.0);
    if !wage.is_finite() || wage < 0.0 {
        return Err(EngineError::invalid("wage must be a non-negative number"));
    }

    let duration_hours = req.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS);
    if !duration_hours.is_finite() || duration_hours <= 0.0 {
        return Err(EngineError::invalid("durationHours must be positive"));
    }

    let radius_km = req
        .radius_km
        .filter(|r| *r != 0.0)
        .unwrap_or(DEFAULT_RADIUS_KM);
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(EngineError::invalid("radiusKm must be a positive number"));
    }

    let now = Utc::now();
    let job = Job {
        id: Uuid::new_v4(),
        farmer_id: actor,
        title: req
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        description: req.description.clone().unwrap_or_default(),
        wage,
        num_workers: req.num_workers.filter(|n| *n > 0).unwrap_or(1),
        start_at: req.start_at.unwrap_or(now),
        duration_hours,
        lat,
        lng,
        radius_km,
        status: JobStatus::Open,
        created_at: now,
    };
    snapshot.jobs.push(job.clone());

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::sign_in;

    fn located() -> CreateJobRequest {
        CreateJobRequest {
            lat: Some(12.9),
            lng: Some(77.6),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let mut snap = Snapshot::default();
        let farmer = sign_in(&mut snap, "+1", Role::Farmer, None, None).user.id;

        let job = post_job(&mut snap, farmer, &located()).unwrap();
        assert_eq!(job.title, "Farm work");
        assert_eq!(job.num_workers, 1);
        assert_eq!(job.duration_hours, 8.0);
        assert_eq!(job.radius_km, 5.0);
        assert_eq!(job.status, JobStatus::Open);
        assert_eq!(job.farmer_id, farmer);
        assert_eq!(snap.jobs.len(), 1);
    }

    #[test]
    fn coordinates_are_required() {
        let mut snap = Snapshot::default();
        let farmer = sign_in(&mut snap, "+1", Role::Farmer, None, None).user.id;

        let req = CreateJobRequest {
            lat: Some(12.9),
            ..Default::default()
        };
        assert!(matches!(post_job(&mut snap, farmer, &req), Err(EngineError::InvalidQuery(_))));
        assert!(snap.jobs.is_empty());
    }

    #[test]
    fn workers_cannot_post() {
        let mut snap = Snapshot::default();
        let worker = sign_in(&mut snap, "+2", Role::Worker, None, None).user.id;

        assert!(matches!(
            post_job(&mut snap, worker, &located()),
            Err(EngineError::RoleMismatch { required: Role::Farmer, .. })
        ));
    }

    #[test]
    fn negative_wage_is_rejected() {
        let mut snap = Snapshot::default();
        let farmer = sign_in(&mut snap, "+1", Role::Farmer, None, None).user.id;

        let req = CreateJobRequest {
            wage: Some(-1.0),
            ..located()
        };
        assert!(matches!(post_job(&mut snap, farmer, &req), Err(EngineError::InvalidQuery(_))));
    }
}
