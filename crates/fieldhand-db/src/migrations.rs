use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            role        TEXT NOT NULL,
            name        TEXT NOT NULL DEFAULT '',
            phone       TEXT NOT NULL UNIQUE,
            language    TEXT NOT NULL DEFAULT 'en',
            rating      REAL NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL,
            position    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workers (
            user_id         TEXT PRIMARY KEY REFERENCES users(id),
            lat             REAL,
            lng             REAL,
            radius_km       REAL NOT NULL DEFAULT 5,
            skills          TEXT NOT NULL DEFAULT '[]',
            rate            REAL NOT NULL DEFAULT 0,
            available_today INTEGER NOT NULL DEFAULT 0,
            reliability     REAL NOT NULL DEFAULT 0,
            reviews         INTEGER NOT NULL DEFAULT 0,
            position        INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS jobs (
            id              TEXT PRIMARY KEY,
            farmer_id       TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            description     TEXT NOT NULL DEFAULT '',
            wage            REAL NOT NULL DEFAULT 0,
            num_workers     INTEGER NOT NULL DEFAULT 1,
            start_at        TEXT NOT NULL,
            duration_hours  REAL NOT NULL DEFAULT 8,
            lat             REAL NOT NULL,
            lng             REAL NOT NULL,
            radius_km       REAL NOT NULL DEFAULT 5,
            status          TEXT NOT NULL DEFAULT 'open',
            created_at      TEXT NOT NULL,
            position        INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_status
            ON jobs(status);

        CREATE TABLE IF NOT EXISTS invites (
            id          TEXT PRIMARY KEY,
            job_id      TEXT NOT NULL REFERENCES jobs(id),
            worker_id   TEXT NOT NULL REFERENCES workers(user_id),
            status      TEXT NOT NULL DEFAULT 'invited',
            created_at  TEXT NOT NULL,
            position    INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_invites_worker
            ON invites(worker_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
