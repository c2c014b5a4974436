use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use secrecy::Secret;
use tracing::error;
use uuid::Uuid;

use crate::auth::decode_token;
use crate::errors::AppError;

/// The caller whose rows a request may read or write, taken from the bearer JWT `sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub id: Uuid,
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn resolve_owner(req: &HttpRequest) -> Result<Owner, AppError> {
    let Some(secret) = req.app_data::<web::Data<Secret<String>>>() else {
        error!("JWT secret missing from app data");
        return Err(AppError::Unauthorized(
            "Authentication is not configured".to_string(),
        ));
    };

    let token = bearer_token(req).ok_or_else(|| {
        AppError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    // Expiry and signature are checked here; the owner is whatever `sub` names
    let claims = decode_token(token, secret.get_ref())?;
    Ok(Owner { id: claims.sub })
}

impl FromRequest for Owner {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve_owner(req))
    }
}
