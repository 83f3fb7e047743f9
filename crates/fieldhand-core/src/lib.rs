//! Matching rules for the fieldhand marketplace.
//!
//! Everything here is synchronous and operates on an in-memory
//! [`Snapshot`](fieldhand_types::models::Snapshot); callers are expected to
//! run it inside a [`Ledger`](fieldhand_db::Ledger) transaction.

pub mod accounts;
pub mod error;
pub mod geo;
pub mod invites;
pub mod jobs;
pub mod profiles;
pub mod search;

pub use error::EngineError;
