use actix_web::{web, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::auth::BearerAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, UserResponse};
use crate::services::{AuthTokenService, UsersService};

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    expires_at: Option<DateTime<Utc>>,
    user: UserResponse,
}

#[derive(Serialize)]
struct MeResponse {
    user: Option<UserResponse>,
    token_id: i32,
    expires_at: Option<DateTime<Utc>>,
}

/// POST /api/auth/login
/// Verify admin credentials and issue a bearer token
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    req: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let user = UsersService::find_by_email(pool.get_ref(), &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }

    if !user.check_password(&req.password)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    UsersService::record_login(pool.get_ref(), user.id).await?;

    let expires_at = config
        .security
        .token_ttl_hours
        .map(|hours| Utc::now() + Duration::hours(hours));

    let description = format!("Login session for {}", user.email);
    let token =
        AuthTokenService::issue(pool.get_ref(), Some(&description), Some(user.id), expires_at)
            .await?;

    log::info!("Admin {} logged in", user.email);

    Ok(HttpResponse::Created().json(LoginResponse {
        token: token.token,
        expires_at: token.expires_at,
        user: user.into(),
    }))
}

/// POST /api/auth/logout
/// Revoke the token used for this request
pub async fn logout(pool: web::Data<DbPool>, auth: BearerAuth) -> AppResult<HttpResponse> {
    AuthTokenService::revoke(pool.get_ref(), auth.token.id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/auth/me
/// Describe the presented token and the admin it belongs to
pub async fn me(pool: web::Data<DbPool>, auth: BearerAuth) -> AppResult<HttpResponse> {
    let user = match auth.token.user_id {
        Some(user_id) => UsersService::find_by_id(pool.get_ref(), user_id)
            .await?
            .map(UserResponse::from),
        None => None,
    };

    Ok(HttpResponse::Ok().json(MeResponse {
        user,
        token_id: auth.token.id,
        expires_at: auth.token.expires_at,
    }))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}
