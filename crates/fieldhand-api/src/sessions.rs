use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info};

use fieldhand_types::models::Role;

use crate::state::AppState;

struct PendingCode {
    code: String,
    role: Role,
    issued_at: Instant,
}

/// A code taken out of [`OtpSessions`] by a successful match.
pub struct Redeemed {
    phone: String,
    entry: PendingCode,
}

/// One-time codes awaiting verification, keyed by phone number.
///
/// Ephemeral session state: kept only in memory, separate from the record
/// store, and lost on restart.
pub struct OtpSessions {
    pending: Mutex<HashMap<String, PendingCode>>,
    ttl: Duration,
}

impl OtpSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a fresh six-digit code for `phone`, replacing any earlier one.
    pub fn issue(&self, phone: &str, role: Role) -> String {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                phone.to_string(),
                PendingCode {
                    code: code.clone(),
                    role,
                    issued_at: Instant::now(),
                },
            );
        debug!("Issued one-time code for {}", phone);
        code
    }

    /// Claim the pending code if `code` and `role` match and it has not
    /// expired. A mismatch leaves the pending code in place.
    pub fn redeem(&self, phone: &str, role: Role, code: &str) -> Option<Redeemed> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = pending.get(phone)?;

        if entry.issued_at.elapsed() > self.ttl {
            pending.remove(phone);
            return None;
        }
        if entry.code != code || entry.role != role {
            return None;
        }

        pending.remove_entry(phone).map(|(phone, entry)| Redeemed { phone, entry })
    }

    /// Put a claimed code back after the sign-in it was claimed for failed.
    /// A code issued in the meantime takes precedence.
    pub fn reinstate(&self, redeemed: Redeemed) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(redeemed.phone)
            .or_insert(redeemed.entry);
    }

    pub fn purge_expired(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let before = pending.len();
        pending.retain(|_, entry| entry.issued_at.elapsed() <= self.ttl);
        before - pending.len()
    }
}

/// Background task that drops expired one-time codes.
pub async fn run_purge_loop(state: AppState, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        let purged = state.sessions.purge_expired();
        if purged > 0 {
            info!("Purged {} expired one-time code(s)", purged);
        }
    }
}
