use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use fieldhand_db::Ledger;
use fieldhand_gateway::Dispatcher;

use crate::error::ApiError;
use crate::sessions::OtpSessions;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub ledger: Ledger,
    pub dispatcher: Dispatcher,
    pub sessions: OtpSessions,
    pub settings: ApiSettings,
}

/// Tunables the HTTP layer needs at request time.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub heartbeat: Duration,
    pub channel_capacity: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-change-me".into(),
            token_ttl: chrono::Duration::days(30),
            heartbeat: fieldhand_gateway::stream::HEARTBEAT_INTERVAL,
            channel_capacity: 64,
        }
    }
}

/// Run ledger work off the async runtime.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}
