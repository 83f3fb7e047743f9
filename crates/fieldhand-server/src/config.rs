use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use fieldhand_api::state::ApiSettings;

/// Secrets that are only acceptable on a developer machine.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub otp_ttl: Duration,
    pub api: ApiSettings,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults, malformed
    /// numbers are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("FIELDHAND_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "dev-secret-change-me".into());
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            warn!("FIELDHAND_JWT_SECRET is unset or a placeholder; tokens are forgeable");
        }

        let token_ttl_days: i64 = parse_or(&lookup, "FIELDHAND_TOKEN_TTL_DAYS", 30)?;
        let otp_ttl_secs: u64 = parse_or(&lookup, "FIELDHAND_OTP_TTL_SECS", 300)?;
        let heartbeat_secs: u64 = parse_or(&lookup, "FIELDHAND_HEARTBEAT_SECS", 25)?;
        let channel_capacity: usize = parse_or(&lookup, "FIELDHAND_CHANNEL_CAPACITY", 64)?;
        anyhow::ensure!(heartbeat_secs > 0, "FIELDHAND_HEARTBEAT_SECS must be positive");
        anyhow::ensure!(channel_capacity > 0, "FIELDHAND_CHANNEL_CAPACITY must be positive");
        let token_ttl = chrono::Duration::try_days(token_ttl_days)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .context("FIELDHAND_TOKEN_TTL_DAYS is out of range")?;

        Ok(Self {
            host: lookup("FIELDHAND_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "FIELDHAND_PORT", 3000)?,
            db_path: lookup("FIELDHAND_DB_PATH")
                .unwrap_or_else(|| "fieldhand.db".into())
                .into(),
            static_dir: lookup("FIELDHAND_STATIC_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            otp_ttl: Duration::from_secs(otp_ttl_secs),
            api: ApiSettings {
                jwt_secret,
                token_ttl,
                heartbeat: Duration::from_secs(heartbeat_secs),
                channel_capacity,
            },
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: {:?}", key, raw)),
        None => Ok(default),
    }
}
