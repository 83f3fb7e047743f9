use uuid::Uuid;

use fieldhand_db::StoreUnavailable;
use fieldhand_types::models::Role;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Requires the {required} role, actor is a {actual}")]
    RoleMismatch { required: Role, actual: Role },

    #[error(transparent)]
    StoreUnavailable(#[from] StoreUnavailable),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }
}
