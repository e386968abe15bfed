use actix_web::{web, HttpResponse};

use crate::auth::BearerAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateAuthToken, IssuedToken, TokenSummary};
use crate::services::AuthTokenService;

/// GET /api/tokens - Every token, secrets masked
pub async fn list_tokens(pool: web::Data<DbPool>, _auth: BearerAuth) -> AppResult<HttpResponse> {
    let tokens = AuthTokenService::list(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(tokens.iter().map(TokenSummary::from).collect::<Vec<_>>()))
}

/// POST /api/tokens - Issue a non-expiring API token.
/// API tokens belong to no admin, so they outlive the caller's session.
pub async fn create_token(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    body: web::Json<CreateAuthToken>,
) -> AppResult<HttpResponse> {
    let token = AuthTokenService::issue(
        pool.get_ref(),
        body.description.as_deref(),
        None,
        None,
    )
    .await?;

    Ok(HttpResponse::Created().json(IssuedToken::from(token)))
}

/// DELETE /api/tokens/{id} - Revoke a token
pub async fn revoke_token(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    AuthTokenService::revoke(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tokens")
            .route("", web::get().to(list_tokens))
            .route("", web::post().to(create_token))
            .route("/{id}", web::delete().to(revoke_token)),
    );
}
