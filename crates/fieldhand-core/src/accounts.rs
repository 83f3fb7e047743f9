use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use fieldhand_types::models::{Role, Snapshot, User};

use crate::error::EngineError;

/// Result of a successful identity verification.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: User,
    pub created: bool,
}

/// Find or create the user behind a verified phone number.
///
/// A returning user who verifies under a different role is switched to that
/// role; any worker profile or jobs they already own are left in place.
pub fn sign_in(
    snapshot: &mut Snapshot,
    phone: &str,
    role: Role,
    name: Option<&str>,
    language: Option<&str>,
) -> SignIn {
    if let Some(user) = snapshot.user_by_phone_mut(phone) {
        if user.role != role {
            info!("User {} switching role {} -> {}", user.id, user.role, role);
            user.role = role;
        }
        return SignIn {
            user: user.clone(),
            created: false,
        };
    }

    let user = User {
        id: Uuid::new_v4(),
        role,
        name: name.unwrap_or_default().trim().to_string(),
        phone: phone.to_string(),
        language: language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("en")
            .to_string(),
        rating: 0.0,
        created_at: Utc::now(),
    };
    snapshot.users.push(user.clone());
    info!("Created {} account {}", role, user.id);

    SignIn {
        user,
        created: true,
    }
}

/// The acting user, checked against the role an operation needs.
pub fn require_role(snapshot: &Snapshot, actor: Uuid, required: Role) -> Result<&User, EngineError> {
    let user = snapshot
        .user(actor)
        .ok_or_else(|| EngineError::not_found("User", actor))?;
    if user.role != required {
        return Err(EngineError::RoleMismatch {
            required,
            actual: user.role,
        });
    }
    Ok(user)
}
