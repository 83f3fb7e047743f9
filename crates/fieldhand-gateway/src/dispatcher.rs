use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use fieldhand_core::invites::Acceptance;
use fieldhand_core::search::workers_in_reach;
use fieldhand_types::events::Notification;
use fieldhand_types::models::{Invite, Job, WorkerProfile};

use crate::registry::{DeliveryError, NotificationRegistry};

/// Per-call delivery tally. Only used for logging and tests; a failed
/// delivery never fails the triggering operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    fn absorb(&mut self, other: DeliveryReport) {
        self.recipients += other.recipients;
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Turns domain events into notifications and writes them to every live
/// channel of each recipient.
///
/// All methods are synchronous and never wait on a connection: writes are
/// queued on each channel's buffer. Call them while the commit that produced
/// the event is still held, so a recipient sees events in commit order.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: NotificationRegistry,
}

impl Dispatcher {
    pub fn new(registry: NotificationRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &NotificationRegistry {
        &self.registry
    }

    /// Alert every worker inside the job's radius, nearest first.
    pub fn job_created(&self, job: &Job, workers: &[WorkerProfile]) -> DeliveryReport {
        let nearby = match workers_in_reach(job, workers) {
            Ok(nearby) => nearby,
            Err(e) => {
                warn!("Skipping job alerts for {}: {}", job.id, e);
                return DeliveryReport::default();
            }
        };

        let mut report = DeliveryReport::default();
        for hit in nearby {
            let event = Notification::JobAlert {
                job_id: job.id,
                title: job.title.clone(),
                wage: job.wage,
                distance_km: hit.display_distance(),
                lat: job.lat,
                lng: job.lng,
            };
            report.absorb(self.send_to_user(hit.item.user_id, &event));
        }

        debug!(
            "Job {} alerted {} worker(s): {} delivered, {} failed",
            job.id, report.recipients, report.delivered, report.failed
        );
        report
    }

    pub fn invite_created(&self, invite: &Invite, job: &Job) -> DeliveryReport {
        let event = Notification::Invite {
            job_id: job.id,
            invite_id: invite.id,
            title: job.title.clone(),
            wage: job.wage,
        };
        self.send_to_user(invite.worker_id, &event)
    }

    pub fn invite_accepted(&self, acceptance: &Acceptance) -> DeliveryReport {
        let event = Notification::InviteResponse {
            invite_id: acceptance.invite.id,
            status: acceptance.invite.status,
            worker_id: acceptance.invite.worker_id,
        };
        self.send_to_user(acceptance.farmer_id, &event)
    }

    /// Write `event` to each live channel of `user_id`. Users with no live
    /// channel simply miss the event.
    pub fn send_to_user(&self, user_id: Uuid, event: &Notification) -> DeliveryReport {
        let payload: Arc<str> = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                warn!("Failed to serialize {} notification: {}", event.kind(), e);
                return DeliveryReport::default();
            }
        };

        let mut report = DeliveryReport {
            recipients: 1,
            ..Default::default()
        };

        for channel in self.registry.channels_for(user_id) {
            match channel.write(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::Closed) => {
                    report.failed += 1;
                    self.registry.deregister(user_id, channel.id());
                    debug!("Dropped closed channel {} for user {}", channel.id(), user_id);
                }
                Err(DeliveryError::Full) => {
                    report.failed += 1;
                    warn!(
                        "Channel {} for user {} is full, dropping {} notification",
                        channel.id(),
                        user_id,
                        event.kind()
                    );
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fieldhand_types::models::{InviteStatus, JobStatus};

    use super::*;

    fn job(radius_km: f64) -> Job {
        Job {
            id: Uuid::new_v4(),
            farmer_id: Uuid::new_v4(),
            title: "Harvest".into(),
            description: String::new(),
            wage: 500.0,
            num_workers: 2,
            start_at: Utc::now(),
            duration_hours: 8.0,
            lat: 12.90,
            lng: 77.60,
            radius_km,
            status: JobStatus::Open,
            created_at: Utc::now(),
        }
    }

    fn worker_at(lat: Option<f64>, lng: Option<f64>) -> WorkerProfile {
        let mut w = WorkerProfile::new(Uuid::new_v4());
        w.lat = lat;
        w.lng = lng;
        w
    }

    fn invite_for(job: &Job, worker_id: Uuid) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            job_id: job.id,
            worker_id,
            status: InviteStatus::Invited,
            created_at: Utc::now(),
        }
    }

    fn decode(payload: &str) -> Notification {
        serde_json::from_str(payload).unwrap()
    }

    #[tokio::test]
    async fn job_alerts_reach_exactly_the_workers_in_radius() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let near = worker_at(Some(12.95), Some(77.62));
        let far = worker_at(Some(13.50), Some(77.60));
        let unset = worker_at(None, None);

        let mut near_sub = dispatcher.registry().open(near.user_id, 8);
        let far_sub = dispatcher.registry().open(far.user_id, 8);
        let unset_sub = dispatcher.registry().open(unset.user_id, 8);

        let job = job(10.0);
        let report = dispatcher.job_created(&job, &[near.clone(), far, unset]);
        assert_eq!(report, DeliveryReport { recipients: 1, delivered: 1, failed: 0 });

        match decode(&near_sub.recv().await.unwrap()) {
            Notification::JobAlert { job_id, distance_km, .. } => {
                assert_eq!(job_id, job.id);
                assert_eq!(distance_km, 5.97);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(far_sub.pending(), 0);
        assert_eq!(unset_sub.pending(), 0);
        assert_eq!(near_sub.pending(), 0);
    }

    #[tokio::test]
    async fn every_channel_of_a_recipient_gets_the_event() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let worker = Uuid::new_v4();
        let mut phone = dispatcher.registry().open(worker, 8);
        let mut laptop = dispatcher.registry().open(worker, 8);

        let job = job(5.0);
        let invite = invite_for(&job, worker);
        let report = dispatcher.invite_created(&invite, &job);
        assert_eq!(report.delivered, 2);

        for sub in [&mut phone, &mut laptop] {
            let event = decode(&sub.recv().await.unwrap());
            assert_eq!(
                event,
                Notification::Invite {
                    job_id: job.id,
                    invite_id: invite.id,
                    title: "Harvest".into(),
                    wage: 500.0,
                }
            );
        }
    }

    #[tokio::test]
    async fn acceptance_goes_to_the_farmer() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let job = job(5.0);
        let mut farmer = dispatcher.registry().open(job.farmer_id, 8);

        let mut invite = invite_for(&job, Uuid::new_v4());
        invite.status = InviteStatus::Accepted;
        let acceptance = Acceptance {
            farmer_id: job.farmer_id,
            invite: invite.clone(),
            transitioned: true,
        };
        dispatcher.invite_accepted(&acceptance);

        assert_eq!(
            decode(&farmer.recv().await.unwrap()),
            Notification::InviteResponse {
                invite_id: invite.id,
                status: InviteStatus::Accepted,
                worker_id: invite.worker_id,
            }
        );
    }

    #[test]
    fn recipient_without_channels_is_skipped() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let job = job(5.0);
        let report = dispatcher.invite_created(&invite_for(&job, Uuid::new_v4()), &job);
        assert_eq!(report, DeliveryReport { recipients: 1, delivered: 0, failed: 0 });
    }

    #[tokio::test]
    async fn closed_channel_does_not_stop_the_broadcast() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let workers: Vec<_> = (0..3_i32).map(|i| worker_at(Some(12.90 + f64::from(i) * 0.001), Some(77.60))).collect();

        let mut first = dispatcher.registry().open(workers[0].user_id, 8);
        let (gone_handle, gone_rx) = crate::registry::channel(8);
        dispatcher.registry().register(workers[1].user_id, gone_handle);
        drop(gone_rx);
        let mut third = dispatcher.registry().open(workers[2].user_id, 8);

        let report = dispatcher.job_created(&job(5.0), &workers);
        assert_eq!(report, DeliveryReport { recipients: 3, delivered: 2, failed: 1 });
        assert!(first.recv().await.is_some());
        assert!(third.recv().await.is_some());
        assert!(dispatcher.registry().channels_for(workers[1].user_id).is_empty());
    }

    #[tokio::test]
    async fn full_channel_is_isolated() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let worker = Uuid::new_v4();
        let mut slow = dispatcher.registry().open(worker, 1);
        let mut fast = dispatcher.registry().open(worker, 8);

        let job = job(5.0);
        dispatcher.invite_created(&invite_for(&job, worker), &job);
        let report = dispatcher.invite_created(&invite_for(&job, worker), &job);
        assert_eq!(report, DeliveryReport { recipients: 1, delivered: 1, failed: 1 });

        assert!(slow.recv().await.is_some());
        assert!(fast.recv().await.is_some());
        assert!(fast.recv().await.is_some());
        // Full is not closed: the slow channel stays registered.
        assert_eq!(dispatcher.registry().channels_for(worker).len(), 2);
    }

    #[tokio::test]
    async fn sequential_events_arrive_in_order() {
        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let worker = Uuid::new_v4();
        let mut sub = dispatcher.registry().open(worker, 8);

        let job = job(5.0);
        let first = invite_for(&job, worker);
        let second = invite_for(&job, worker);
        dispatcher.invite_created(&first, &job);
        dispatcher.invite_created(&second, &job);

        for expected in [first.id, second.id] {
            match decode(&sub.recv().await.unwrap()) {
                Notification::Invite { invite_id, .. } => assert_eq!(invite_id, expected),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn committed_invites_arrive_in_commit_order() {
        use std::sync::Arc;
        use fieldhand_db::{Ledger, MemoryStore};

        let dispatcher = Dispatcher::new(NotificationRegistry::new());
        let ledger = Arc::new(Ledger::new(MemoryStore::default()));
        let job = Arc::new(job(5.0));
        let worker = Uuid::new_v4();
        let mut sub = dispatcher.registry().open(worker, 64);

        let threads: Vec<_> = (0..16)
            .map(|_| {
                let (ledger, dispatcher, job) = (ledger.clone(), dispatcher.clone(), job.clone());
                std::thread::spawn(move || {
                    ledger
                        .commit(
                            |snap| {
                                let invite = invite_for(&job, worker);
                                snap.invites.push(invite.clone());
                                Ok::<_, fieldhand_core::EngineError>(invite)
                            },
                            |_, invite| {
                                dispatcher.invite_created(invite, &job);
                            },
                        )
                        .unwrap();
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        let committed: Vec<Uuid> = ledger
            .read(|snap| Ok::<_, fieldhand_core::EngineError>(snap.invites.iter().map(|i| i.id).collect()))
            .unwrap();
        assert_eq!(committed.len(), 16);

        let mut received = Vec::new();
        while received.len() < committed.len() {
            match decode(&sub.recv().await.unwrap()) {
                Notification::Invite { invite_id, .. } => received.push(invite_id),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(received, committed);
    }
}
