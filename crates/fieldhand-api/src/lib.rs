pub mod auth;
pub mod error;
pub mod events;
pub mod extract;
pub mod invites;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod workers;
