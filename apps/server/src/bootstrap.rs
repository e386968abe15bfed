use log::{info, warn};
use sqlx::PgPool;
use std::env;

use crate::error::{AppError, AppResult};
use crate::models::CreateUserRequest;
use crate::services::{AuthTokenService, UsersService};

/// Bootstrap initial admin from CREATE_SUPERUSER env var
/// Format: "email:password"
/// Only creates the user if no users exist yet
pub async fn create_superuser_if_needed(pool: &PgPool) -> AppResult<()> {
    let create_superuser = match env::var("CREATE_SUPERUSER") {
        Ok(val) if !val.is_empty() => val,
        _ => {
            info!("CREATE_SUPERUSER not set, skipping superuser creation");
            return Ok(());
        }
    };

    if UsersService::count(pool).await? > 0 {
        warn!("CREATE_SUPERUSER set but users already exist. Skipping superuser creation.");
        return Ok(());
    }

    let req = parse_superuser_spec(&create_superuser)?;
    let user = UsersService::create(pool, &req).await?;
    info!("Superuser created: {}", user.email);

    Ok(())
}

/// Splits "email:password" into a user creation request
pub fn parse_superuser_spec(spec: &str) -> AppResult<CreateUserRequest> {
    let (email, password) = spec.split_once(':').ok_or_else(|| {
        AppError::Validation("CREATE_SUPERUSER must be in format 'email:password'".to_string())
    })?;

    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    Ok(CreateUserRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

/// Bootstrap: create an initial API token if none exist and
/// PROFSITE_BOOTSTRAP_TOKEN is set. Returns the token so the caller can show it.
pub async fn create_token_if_needed(pool: &PgPool) -> AppResult<Option<String>> {
    if env::var("PROFSITE_BOOTSTRAP_TOKEN").is_err() {
        return Ok(None);
    }

    if AuthTokenService::count(pool).await? > 0 {
        info!("Auth tokens already exist, skipping bootstrap");
        return Ok(None);
    }

    let token =
        AuthTokenService::issue(pool, Some("Bootstrap token (created automatically)"), None, None)
            .await?;
    info!("Bootstrap token created successfully");

    Ok(Some(token.token))
}
