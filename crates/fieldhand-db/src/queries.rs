use anyhow::Result;
use rusqlite::{Connection, params};

use fieldhand_types::models::{Invite, Job, Snapshot, User, WorkerProfile};

use crate::Database;
use crate::models::{InviteRow, JobRow, UserRow, WorkerRow};

impl Database {
    /// Read all four collections in insertion order.
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        self.with_conn(|conn| {
            Ok(Snapshot {
                users: query_users(conn)?,
                workers: query_workers(conn)?,
                jobs: query_jobs(conn)?,
                invites: query_invites(conn)?,
            })
        })
    }

    /// Replace the stored collections with `snapshot` in one transaction.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            // Children first so foreign keys hold throughout.
            tx.execute_batch(
                "DELETE FROM invites; DELETE FROM jobs; DELETE FROM workers; DELETE FROM users;",
            )?;

            for (pos, user) in snapshot.users.iter().enumerate() {
                insert_user(&tx, user, pos)?;
            }
            for (pos, worker) in snapshot.workers.iter().enumerate() {
                insert_worker(&tx, worker, pos)?;
            }
            for (pos, job) in snapshot.jobs.iter().enumerate() {
                insert_job(&tx, job, pos)?;
            }
            for (pos, invite) in snapshot.invites.iter().enumerate() {
                insert_invite(&tx, invite, pos)?;
            }

            tx.commit()?;
            Ok(())
        })
    }
}

fn insert_user(conn: &Connection, user: &User, pos: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, role, name, phone, language, rating, created_at, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_string(),
            user.role.as_str(),
            user.name,
            user.phone,
            user.language,
            user.rating,
            user.created_at.to_rfc3339(),
            pos as i64,
        ],
    )?;
    Ok(())
}

fn insert_worker(conn: &Connection, worker: &WorkerProfile, pos: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO workers (user_id, lat, lng, radius_km, skills, rate, available_today, reliability, reviews, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            worker.user_id.to_string(),
            worker.lat,
            worker.lng,
            worker.radius_km,
            serde_json::to_string(&worker.skills)?,
            worker.rate,
            worker.available_today,
            worker.reliability,
            worker.reviews,
            pos as i64,
        ],
    )?;
    Ok(())
}

fn insert_job(conn: &Connection, job: &Job, pos: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO jobs (id, farmer_id, title, description, wage, num_workers, start_at,
                           duration_hours, lat, lng, radius_km, status, created_at, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            job.id.to_string(),
            job.farmer_id.to_string(),
            job.title,
            job.description,
            job.wage,
            job.num_workers,
            job.start_at.to_rfc3339(),
            job.duration_hours,
            job.lat,
            job.lng,
            job.radius_km,
            job.status.as_str(),
            job.created_at.to_rfc3339(),
            pos as i64,
        ],
    )?;
    Ok(())
}

fn insert_invite(conn: &Connection, invite: &Invite, pos: usize) -> Result<()> {
    conn.execute(
        "INSERT INTO invites (id, job_id, worker_id, status, created_at, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            invite.id.to_string(),
            invite.job_id.to_string(),
            invite.worker_id.to_string(),
            invite.status.as_str(),
            invite.created_at.to_rfc3339(),
            pos as i64,
        ],
    )?;
    Ok(())
}

fn query_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, role, name, phone, language, rating, created_at FROM users ORDER BY position",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                role: row.get(1)?,
                name: row.get(2)?,
                phone: row.get(3)?,
                language: row.get(4)?,
                rating: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(User::try_from).collect()
}

fn query_workers(conn: &Connection) -> Result<Vec<WorkerProfile>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, lat, lng, radius_km, skills, rate, available_today, reliability, reviews
         FROM workers ORDER BY position",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(WorkerRow {
                user_id: row.get(0)?,
                lat: row.get(1)?,
                lng: row.get(2)?,
                radius_km: row.get(3)?,
                skills: row.get(4)?,
                rate: row.get(5)?,
                available_today: row.get(6)?,
                reliability: row.get(7)?,
                reviews: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(WorkerProfile::try_from).collect()
}

fn query_jobs(conn: &Connection) -> Result<Vec<Job>> {
    let mut stmt = conn.prepare(
        "SELECT id, farmer_id, title, description, wage, num_workers, start_at,
                duration_hours, lat, lng, radius_km, status, created_at
         FROM jobs ORDER BY position",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(JobRow {
                id: row.get(0)?,
                farmer_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                wage: row.get(4)?,
                num_workers: row.get(5)?,
                start_at: row.get(6)?,
                duration_hours: row.get(7)?,
                lat: row.get(8)?,
                lng: row.get(9)?,
                radius_km: row.get(10)?,
                status: row.get(11)?,
                created_at: row.get(12)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(Job::try_from).collect()
}

fn query_invites(conn: &Connection) -> Result<Vec<Invite>> {
    let mut stmt = conn.prepare(
        "SELECT id, job_id, worker_id, status, created_at FROM invites ORDER BY position",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(InviteRow {
                id: row.get(0)?,
                job_id: row.get(1)?,
                worker_id: row.get(2)?,
                status: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(Invite::try_from).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use fieldhand_types::models::{InviteStatus, JobStatus, Role};

    use super::*;

    fn sample_snapshot() -> Snapshot {
        let farmer = User {
            id: Uuid::new_v4(),
            role: Role::Farmer,
            name: "Asha".into(),
            phone: "+911".into(),
            language: "kn".into(),
            rating: 4.5,
            created_at: Utc::now(),
        };
        let worker_user = User {
            id: Uuid::new_v4(),
            role: Role::Worker,
            name: "Ravi".into(),
            phone: "+912".into(),
            language: "en".into(),
            rating: 0.0,
            created_at: Utc::now(),
        };
        let mut worker = WorkerProfile::new(worker_user.id);
        worker.lat = Some(12.95);
        worker.lng = Some(77.62);
        worker.skills = vec!["Plowing".into(), "Harvesting".into()];
        worker.rate = 400.0;
        worker.available_today = true;

        let job = Job {
            id: Uuid::new_v4(),
            farmer_id: farmer.id,
            title: "Harvest".into(),
            description: String::new(),
            wage: 500.0,
            num_workers: 3,
            start_at: Utc::now(),
            duration_hours: 8.0,
            lat: 12.9,
            lng: 77.6,
            radius_km: 10.0,
            status: JobStatus::Open,
            created_at: Utc::now(),
        };
        let invite = Invite {
            id: Uuid::new_v4(),
            job_id: job.id,
            worker_id: worker.user_id,
            status: InviteStatus::Invited,
            created_at: Utc::now(),
        };

        Snapshot {
            users: vec![farmer, worker_user],
            workers: vec![worker],
            jobs: vec![job],
            invites: vec![invite],
        }
    }

    #[test]
    fn empty_database_loads_empty_snapshot() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_snapshot().unwrap(), Snapshot::default());
    }

    #[test]
    fn saved_snapshot_loads_back_identically() {
        let db = Database::open_in_memory().unwrap();
        let snapshot = sample_snapshot();

        db.save_snapshot(&snapshot).unwrap();
        assert_eq!(db.load_snapshot().unwrap(), snapshot);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let db = Database::open_in_memory().unwrap();
        let mut snapshot = sample_snapshot();
        db.save_snapshot(&snapshot).unwrap();

        snapshot.invites[0].status = InviteStatus::Accepted;
        let extra = Invite {
            id: Uuid::new_v4(),
            ..snapshot.invites[0].clone()
        };
        snapshot.invites.push(extra);
        db.save_snapshot(&snapshot).unwrap();

        let loaded = db.load_snapshot().unwrap();
        assert_eq!(loaded.invites.len(), 2);
        assert_eq!(loaded.invites[0].status, InviteStatus::Accepted);
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn dangling_reference_fails_the_save() {
        let db = Database::open_in_memory().unwrap();
        let mut snapshot = sample_snapshot();
        snapshot.jobs[0].farmer_id = Uuid::new_v4();

        assert!(db.save_snapshot(&snapshot).is_err());
        // Transaction rolled back: nothing was written.
        assert_eq!(db.load_snapshot().unwrap(), Snapshot::default());
    }
}
