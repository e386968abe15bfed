//! Bearer tokens for the admin API.
//!
//! One table holds both kinds: session tokens issued by login (bound to an
//! admin and usually expiring) and long-lived API tokens created from the
//! admin panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Characters of the secret kept visible in listings
const VISIBLE_PREFIX: usize = 8;

#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub id: i32,
    pub token: String,
    pub user_id: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Expiry is inclusive: a token is dead from `expires_at` on
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Issued by login rather than created by hand
    pub fn is_session(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Body of `POST /api/tokens`
#[derive(Debug, Default, Deserialize)]
pub struct CreateAuthToken {
    #[serde(default)]
    pub description: Option<String>,
}

/// Listing entry; the secret is cut down to a short prefix
#[derive(Debug, Serialize)]
pub struct TokenSummary {
    pub id: i32,
    pub token_prefix: String,
    pub user_id: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&AuthToken> for TokenSummary {
    fn from(token: &AuthToken) -> Self {
        let prefix: String = token.token.chars().take(VISIBLE_PREFIX).collect();
        Self {
            id: token.id,
            token_prefix: format!("{}...", prefix),
            user_id: token.user_id,
            description: token.description.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
        }
    }
}

/// The full secret, returned exactly once when the token is issued
#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub id: i32,
    pub token: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<AuthToken> for IssuedToken {
    fn from(token: AuthToken) -> Self {
        Self {
            id: token.id,
            token: token.token,
            description: token.description,
            created_at: token.created_at,
            expires_at: token.expires_at,
        }
    }
}
