use uuid::Uuid;

use fieldhand_types::api::ProfileUpsertRequest;
use fieldhand_types::models::{Role, Snapshot, User, WorkerProfile};

use crate::accounts::require_role;
use crate::error::EngineError;

/// Create or update the acting worker's profile. Only supplied fields change.
pub fn upsert_profile(
    snapshot: &mut Snapshot,
    actor: Uuid,
    req: &ProfileUpsertRequest,
) -> Result<(User, WorkerProfile), EngineError> {
    require_role(snapshot, actor, Role::Worker)?;
    validate(req)?;

    let user = snapshot
        .user_mut(actor)
        .ok_or_else(|| EngineError::not_found("User", actor))?;
    if let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        user.name = name.to_string();
    }
    let user = user.clone();

    let idx = match snapshot.workers.iter().position(|w| w.user_id == actor) {
        Some(idx) => idx,
        None => {
            snapshot.workers.push(WorkerProfile::new(actor));
            snapshot.workers.len() - 1
        }
    };
    let worker = &mut snapshot.workers[idx];

    if let Some(lat) = req.lat {
        worker.lat = Some(lat);
    }
    if let Some(lng) = req.lng {
        worker.lng = Some(lng);
    }
    if let Some(radius_km) = req.radius_km {
        worker.radius_km = radius_km;
    }
    if let Some(skills) = &req.skills {
        worker.skills = skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(rate) = req.rate {
        worker.rate = rate;
    }
    if let Some(available) = req.available_today {
        worker.available_today = available;
    }

    Ok((user, worker.clone()))
}

fn validate(req: &ProfileUpsertRequest) -> Result<(), EngineError> {
    if req.lat.is_some_and(|v| !v.is_finite()) || req.lng.is_some_and(|v| !v.is_finite()) {
        return Err(EngineError::invalid("lat,lng must be finite numbers"));
    }
    if req.radius_km.is_some_and(|r| !r.is_finite() || r <= 0.0) {
        return Err(EngineError::invalid("radiusKm must be a positive number"));
    }
    if req.rate.is_some_and(|r| !r.is_finite() || r < 0.0) {
        return Err(EngineError::invalid("rate must be a non-negative number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::sign_in;

    #[test]
    fn first_upsert_creates_profile_with_defaults() {
        let mut snap = Snapshot::default();
        let worker = sign_in(&mut snap, "+2", Role::Worker, None, None).user.id;

        let (_, profile) = upsert_profile(&mut snap, worker, &ProfileUpsertRequest::default()).unwrap();
        assert_eq!(profile, WorkerProfile::new(worker));
        assert!(profile.location().is_none());
        assert_eq!(snap.workers.len(), 1);
    }

    #[test]
    fn supplied_fields_overwrite() {
        let mut snap = Snapshot::default();
        let worker = sign_in(&mut snap, "+2", Role::Worker, None, None).user.id;

        let req = ProfileUpsertRequest {
            name: Some("Ravi".into()),
            lat: Some(12.95),
            lng: Some(77.62),
            skills: Some(vec![" Plowing ".into(), "".into(), "Harvesting".into()]),
            rate: Some(400.0),
            available_today: Some(true),
            ..Default::default()
        };
        let (user, profile) = upsert_profile(&mut snap, worker, &req).unwrap();
        assert_eq!(user.name, "Ravi");
        assert_eq!(profile.skills, vec!["Plowing".to_string(), "Harvesting".to_string()]);
        assert!(profile.location().is_some());

        let (_, profile) = upsert_profile(
            &mut snap,
            worker,
            &ProfileUpsertRequest {
                available_today: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!profile.available_today);
        assert_eq!(profile.rate, 400.0);
        assert_eq!(snap.workers.len(), 1);
    }

    #[test]
    fn farmers_cannot_upsert() {
        let mut snap = Snapshot::default();
        let farmer = sign_in(&mut snap, "+1", Role::Farmer, None, None).user.id;

        assert!(matches!(
            upsert_profile(&mut snap, farmer, &ProfileUpsertRequest::default()),
            Err(EngineError::RoleMismatch { required: Role::Worker, .. })
        ));
        assert!(snap.workers.is_empty());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut snap = Snapshot::default();
        let worker = sign_in(&mut snap, "+2", Role::Worker, None, None).user.id;

        let req = ProfileUpsertRequest {
            rate: Some(-5.0),
            ..Default::default()
        };
        assert!(matches!(upsert_profile(&mut snap, worker, &req), Err(EngineError::InvalidQuery(_))));
        assert!(snap.workers.is_empty());
    }
}
