use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;

use crate::auth::token::{is_valid_token_format, parse_bearer_header};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::AuthToken;
use crate::services::AuthTokenService;

/// Guard for admin endpoints: resolves the request's bearer token.
///
/// Taking `BearerAuth` as a handler argument is enough to make the handler
/// answer 401 to anonymous or expired callers.
pub struct BearerAuth {
    pub token: AuthToken,
}

impl FromRequest for BearerAuth {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let header = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .map(|value| value.to_str().map(String::from));

        Box::pin(async move {
            let pool = pool.ok_or_else(|| {
                AppError::Internal("Database pool not configured".to_string())
            })?;

            let header = match header {
                Some(Ok(header)) => header,
                Some(Err(_)) => return Err(unauthorized("Authorization header is not valid text")),
                None => return Err(unauthorized("Missing Authorization header")),
            };

            let token = authenticate(&pool, &header).await?;

            let id = token.id;
            tokio::spawn(async move {
                if let Err(e) = AuthTokenService::touch(pool.get_ref(), id).await {
                    log::warn!("Could not record use of token {}: {}", id, e);
                }
            });

            Ok(BearerAuth { token })
        })
    }
}

/// Resolves an Authorization header value to a live token
async fn authenticate(pool: &DbPool, header: &str) -> AppResult<AuthToken> {
    let value = parse_bearer_header(header)
        .ok_or_else(|| unauthorized("Expected 'Authorization: Bearer <token>'"))?;

    if !is_valid_token_format(value) {
        return Err(unauthorized("Malformed bearer token"));
    }

    let token = AuthTokenService::find_by_value(pool, value)
        .await?
        .ok_or_else(|| unauthorized("Invalid bearer token"))?;

    if token.is_expired(Utc::now()) {
        return Err(unauthorized("Bearer token expired"));
    }

    Ok(token)
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized(message.to_string())
}
