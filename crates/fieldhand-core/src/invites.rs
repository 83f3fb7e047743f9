//! Invite lifecycle: `invited` -> `accepted`.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use fieldhand_types::models::{Invite, InviteStatus, Role, Snapshot};

use crate::accounts::require_role;
use crate::error::EngineError;

/// Outcome of an accept call.
#[derive(Debug, Clone)]
pub struct Acceptance {
    pub invite: Invite,
    /// Owner of the invite's job; the one to notify.
    pub farmer_id: Uuid,
    /// False when the invite was already accepted and nothing changed.
    pub transitioned: bool,
}

/// Invite `worker_id` to `job_id` on behalf of `actor`.
///
/// Repeated invites for the same pair are kept as separate records.
pub fn create_invite(
    snapshot: &mut Snapshot,
    actor: Uuid,
    job_id: Uuid,
    worker_id: Uuid,
) -> Result<Invite, EngineError> {
    require_role(snapshot, actor, Role::Farmer)?;

    let job = snapshot
        .job(job_id)
        .ok_or_else(|| EngineError::not_found("Job", job_id))?;
    if job.farmer_id != actor {
        return Err(EngineError::Forbidden("Not your job".into()));
    }

    if snapshot.worker(worker_id).is_none() {
        return Err(EngineError::not_found("Worker", worker_id));
    }

    let invite = Invite {
        id: Uuid::new_v4(),
        job_id,
        worker_id,
        status: InviteStatus::Invited,
        created_at: Utc::now(),
    };
    snapshot.invites.push(invite.clone());
    debug!("Invite {} created for job {} -> worker {}", invite.id, job_id, worker_id);

    Ok(invite)
}

/// Accept `invite_id` as `actor`, who must be the invited worker.
/// Accepting an already-accepted invite succeeds without change.
pub fn accept_invite(
    snapshot: &mut Snapshot,
    actor: Uuid,
    invite_id: Uuid,
) -> Result<Acceptance, EngineError> {
    let (job_id, worker_id) = snapshot
        .invite(invite_id)
        .map(|i| (i.job_id, i.worker_id))
        .ok_or_else(|| EngineError::not_found("Invite", invite_id))?;
    if worker_id != actor {
        return Err(EngineError::Forbidden("Not your invite".into()));
    }

    let farmer_id = snapshot
        .job(job_id)
        .map(|j| j.farmer_id)
        .ok_or_else(|| EngineError::not_found("Job", job_id))?;

    let invite = snapshot
        .invite_mut(invite_id)
        .ok_or_else(|| EngineError::not_found("Invite", invite_id))?;
    let transitioned = invite.status == InviteStatus::Invited;
    invite.status = InviteStatus::Accepted;

    Ok(Acceptance {
        invite: invite.clone(),
        farmer_id,
        transitioned,
    })
}

/// Read an invite; visible to the invited worker and the job's owner.
pub fn view_invite(snapshot: &Snapshot, actor: Uuid, invite_id: Uuid) -> Result<Invite, EngineError> {
    let invite = snapshot
        .invite(invite_id)
        .ok_or_else(|| EngineError::not_found("Invite", invite_id))?;

    let owns_job = snapshot
        .job(invite.job_id)
        .is_some_and(|j| j.farmer_id == actor);
    if invite.worker_id != actor && !owns_job {
        return Err(EngineError::Forbidden("Not your invite".into()));
    }

    Ok(invite.clone())
}
