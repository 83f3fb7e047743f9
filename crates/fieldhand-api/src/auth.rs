use axum::{Extension, Json, extract::State};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{error, info};
use uuid::Uuid;

use fieldhand_core::{EngineError, accounts};
use fieldhand_types::api::{AuthResponse, Claims, MeResponse, OtpStartRequest, OtpStartResponse, OtpVerifyRequest};

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::{AppState, run_blocking};

pub async fn otp_start(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OtpStartRequest>,
) -> ApiResult<Json<OtpStartResponse>> {
    let phone = req.phone.trim();
    if phone.is_empty() {
        return Err(ApiError::BadRequest("phone and role required".into()));
    }

    let otp = state.sessions.issue(phone, req.role);
    Ok(Json(OtpStartResponse {
        request_id: Uuid::new_v4(),
        otp,
    }))
}

pub async fn otp_verify(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OtpVerifyRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let phone = req.phone.trim().to_string();
    let claimed = state
        .sessions
        .redeem(&phone, req.role, req.otp.trim())
        .ok_or_else(|| ApiError::BadRequest("Invalid OTP".into()))?;

    let st = state.clone();
    let signed = run_blocking(move || {
        st.ledger
            .commit(
                |snap| {
                    Ok::<_, EngineError>(accounts::sign_in(
                        snap,
                        &phone,
                        req.role,
                        req.name.as_deref(),
                        req.language.as_deref(),
                    ))
                },
                |_, _| {},
            )
            .map_err(ApiError::from)
    })
    .await;

    // The code is only spent once the account is saved.
    let signed = match signed {
        Ok(signed) => signed,
        Err(e) => {
            state.sessions.reinstate(claimed);
            return Err(e);
        }
    };

    let token = create_token(&state.settings.jwt_secret, signed.user.id, state.settings.token_ttl)?;
    info!("User {} signed in as {}", signed.user.id, signed.user.role);

    Ok(Json(AuthResponse {
        token,
        user: signed.user,
    }))
}

pub async fn me(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<Json<MeResponse>> {
    let user = run_blocking(move || {
        state
            .ledger
            .read(|snap| {
                snap.user(claims.sub)
                    .cloned()
                    .ok_or_else(|| EngineError::not_found("User", claims.sub))
            })
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(MeResponse { user }))
}

pub fn create_token(secret: &str, user_id: Uuid, ttl: chrono::Duration) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id,
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).map_err(|e| {
        error!("Token encoding failed: {}", e);
        ApiError::Internal
    })
}

pub fn verify_token(secret: &str, token: &str) -> ApiResult<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| ApiError::Unauthorized)
}
