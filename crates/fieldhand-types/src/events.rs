use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::InviteStatus;

/// Payloads pushed to connected clients. Serialized as one JSON object with
/// a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Notification {
    /// An open job was posted within reach of the recipient
    JobAlert {
        job_id: Uuid,
        title: String,
        wage: f64,
        distance_km: f64,
        lat: f64,
        lng: f64,
    },

    /// The recipient was invited to a job
    Invite {
        job_id: Uuid,
        invite_id: Uuid,
        title: String,
        wage: f64,
    },

    /// A worker answered an invite on one of the recipient's jobs
    InviteResponse {
        invite_id: Uuid,
        status: InviteStatus,
        worker_id: Uuid,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JobAlert { .. } => "job_alert",
            Self::Invite { .. } => "invite",
            Self::InviteResponse { .. } => "invite_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_alert_wire_shape() {
        let job_id = Uuid::new_v4();
        let event = Notification::JobAlert {
            job_id,
            title: "Harvest".into(),
            wage: 500.0,
            distance_km: 6.02,
            lat: 12.9,
            lng: 77.6,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "job_alert");
        assert_eq!(value["jobId"], job_id.to_string());
        assert_eq!(value["distanceKm"], 6.02);
        assert_eq!(value["lng"], 77.6);
    }

    #[test]
    fn invite_response_carries_status() {
        let event = Notification::InviteResponse {
            invite_id: Uuid::new_v4(),
            status: InviteStatus::Accepted,
            worker_id: Uuid::new_v4(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "invite_response");
        assert_eq!(value["status"], "accepted");
        assert!(value.get("workerId").is_some());
        assert_eq!(event.kind(), "invite_response");
    }
}
