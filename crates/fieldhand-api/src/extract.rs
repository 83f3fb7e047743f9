use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// `Json<T>` whose rejections come back as an [`ApiError`] body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// A path segment that names a record. Text that is not an id cannot name
/// one, so it is reported the same as an unknown id.
pub fn parse_id(entity: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::NotFound(format!("{} not found", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_or_are_not_found() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("Invite", &id.to_string()).unwrap(), id);

        let err = parse_id("Invite", "abc").unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Invite not found");
    }
}
