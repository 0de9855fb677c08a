//! Caller identity taken from the `X-User-Name` header.
//!
//! The header is trusted as is; authentication happens upstream of the gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{USER_HEADER, Username};

use crate::error::ApiError;

/// The caller's username. Requests without the header are rejected with 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub Username);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("missing {USER_HEADER} header")))?;
        let name = value
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{USER_HEADER} header is not valid text")))?
            .trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest(format!("{USER_HEADER} header is empty")));
        }
        Ok(Identity(Username::new(name)))
    }
}
