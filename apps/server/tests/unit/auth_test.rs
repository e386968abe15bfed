//! Unit tests for bearer token handling
//!
//! Tests header parsing, token format checks and token expiry/masking.

use chrono::{Duration, TimeZone, Utc};
use profsite::auth::{generate_token, is_valid_token_format, parse_bearer_header};
use profsite::models::{AuthToken, IssuedToken, TokenSummary};

fn token(expires_at: Option<chrono::DateTime<Utc>>) -> AuthToken {
    AuthToken {
        id: 7,
        token: "0123456789abcdef0123456789abcdef01234567".to_string(),
        user_id: Some(1),
        description: Some("Laptop".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        expires_at,
        last_used_at: None,
    }
}

#[test]
fn test_generated_tokens_are_unique_and_valid() {
    let a = generate_token();
    let b = generate_token();

    assert_ne!(a, b);
    assert!(is_valid_token_format(&a));
    assert!(is_valid_token_format(&b));
}

#[test]
fn test_parse_bearer_header_requires_scheme() {
    assert_eq!(parse_bearer_header("Bearer abc123"), Some("abc123"));
    assert_eq!(parse_bearer_header("bearer abc123"), None);
    assert_eq!(parse_bearer_header("Token abc123"), None);
    assert_eq!(parse_bearer_header(""), None);
}

#[test]
fn test_token_without_expiry_never_expires() {
    let t = token(None);
    assert!(!t.is_expired(Utc::now() + Duration::days(3650)));
}

#[test]
fn test_token_expiry_boundary() {
    let expires_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let t = token(Some(expires_at));

    assert!(!t.is_expired(expires_at - Duration::seconds(1)));
    assert!(t.is_expired(expires_at));
    assert!(t.is_expired(expires_at + Duration::hours(1)));
}

#[test]
fn test_token_response_is_masked() {
    let response = TokenSummary::from(&token(None));

    assert_eq!(response.token_prefix, "01234567...");
    assert_eq!(response.id, 7);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("token").is_none());
}

#[test]
fn test_created_response_shows_full_token() {
    let response = IssuedToken::from(token(None));
    assert_eq!(response.token, "0123456789abcdef0123456789abcdef01234567");
}

#[test]
fn test_session_tokens_belong_to_an_admin() {
    let mut t = token(None);
    assert!(t.is_session());

    t.user_id = None;
    assert!(!t.is_session());
}
