//! Integration tests for authentication
//!
//! Covers login, token introspection, logout, token management and the
//! startup bootstrap helpers.

use crate::common::{create_admin_token, test_config, TestDb};
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use profsite::auth::TOKEN_LEN;
use profsite::bootstrap;
use profsite::models::CreateUserRequest;
use profsite::routes;
use profsite::services::{AuthTokenService, UsersService};
use serde_json::{json, Value};
use serial_test::serial;
use sqlx::PgPool;

const ADMIN_EMAIL: &str = "prof@university.edu";
const ADMIN_PASSWORD: &str = "correct horse battery staple";

async fn create_admin(pool: &PgPool) {
    UsersService::create(
        pool,
        &CreateUserRequest {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    )
    .await
    .expect("Failed to create admin");
}

macro_rules! init_app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.pool.clone()))
                .app_data(web::Data::new(test_config()))
                .configure(routes::configure),
        )
        .await
    };
}

// =============================================================================
// Login / Logout
// =============================================================================

#[actix_web::test]
async fn test_login_me_logout() {
    let db = TestDb::new().await;
    create_admin(&db.pool).await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "Prof@University.edu", "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), TOKEN_LEN);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["expires_at"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_login_bad_credentials() {
    let db = TestDb::new().await;
    create_admin(&db.pool).await;
    let app = init_app!(db);

    let attempts = vec![
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
        json!({ "email": "nobody@university.edu", "password": ADMIN_PASSWORD }),
    ];

    for payload in attempts {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[actix_web::test]
async fn test_login_disabled_account() {
    let db = TestDb::new().await;
    create_admin(&db.pool).await;
    sqlx::query("UPDATE users SET is_active = FALSE")
        .execute(&db.pool)
        .await
        .unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_expired_token_rejected() {
    let db = TestDb::new().await;
    let token = AuthTokenService::issue(
        &db.pool,
        None,
        None,
        Some(Utc::now() - Duration::hours(1)),
    )
    .await
    .unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Bearer token expired");

    let purged = AuthTokenService::purge_expired(&db.pool).await.unwrap();
    assert_eq!(purged, 1);
}

#[actix_web::test]
async fn test_duplicate_user_conflicts() {
    let db = TestDb::new().await;
    create_admin(&db.pool).await;

    let err = UsersService::create(
        &db.pool,
        &CreateUserRequest {
            email: ADMIN_EMAIL.to_uppercase(),
            password: "another".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, profsite::error::AppError::Conflict(_)));
}

// =============================================================================
// Token Management
// =============================================================================

#[actix_web::test]
async fn test_tokens_crud() {
    let db = TestDb::new().await;
    let token = create_admin_token(&db.pool).await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/tokens")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "description": "Deploy script" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["token"].as_str().unwrap().len(), TOKEN_LEN);
    let created_id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/tokens")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let listed: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(listed.len(), 2);
    for t in &listed {
        assert!(t.get("token").is_none());
        assert!(t["token_prefix"].as_str().unwrap().ends_with("..."));
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tokens/{}", created_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tokens/{}", created_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_token_created_from_session_is_an_api_token() {
    let db = TestDb::new().await;
    create_admin(&db.pool).await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .to_request();
    let login: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let session = login["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/tokens")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .set_json(json!({ "description": "CI" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    let api_token = created["token"].as_str().unwrap().to_string();

    let stored = AuthTokenService::find_by_value(&db.pool, &api_token)
        .await
        .unwrap()
        .expect("created token is stored");
    assert_eq!(stored.user_id, None);
    assert_eq!(stored.expires_at, None);
    assert!(!stored.is_session());

    // Logging out ends the session only
    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", session)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::get()
        .uri("/api/tokens")
        .insert_header(("Authorization", format!("Bearer {}", api_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

// =============================================================================
// Bootstrap
// =============================================================================

#[actix_web::test]
#[serial]
async fn test_bootstrap_superuser_only_once() {
    let db = TestDb::new().await;
    std::env::set_var("CREATE_SUPERUSER", "Admin@University.edu:s3cret");

    bootstrap::create_superuser_if_needed(&db.pool).await.unwrap();
    bootstrap::create_superuser_if_needed(&db.pool).await.unwrap();

    std::env::remove_var("CREATE_SUPERUSER");

    assert_eq!(UsersService::count(&db.pool).await.unwrap(), 1);
    let user = UsersService::find_by_email(&db.pool, "admin@university.edu")
        .await
        .unwrap()
        .unwrap();
    assert!(user.check_password("s3cret").unwrap());
    assert!(!user.check_password("S3CRET").unwrap());
}

#[actix_web::test]
#[serial]
async fn test_bootstrap_token() {
    let db = TestDb::new().await;

    std::env::remove_var("PROFSITE_BOOTSTRAP_TOKEN");
    assert_eq!(bootstrap::create_token_if_needed(&db.pool).await.unwrap(), None);

    std::env::set_var("PROFSITE_BOOTSTRAP_TOKEN", "1");
    let first = bootstrap::create_token_if_needed(&db.pool).await.unwrap();
    let second = bootstrap::create_token_if_needed(&db.pool).await.unwrap();
    std::env::remove_var("PROFSITE_BOOTSTRAP_TOKEN");

    assert_eq!(first.map(|t| t.len()), Some(TOKEN_LEN));
    assert_eq!(second, None);
}
