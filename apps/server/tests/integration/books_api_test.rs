//! Integration tests for the Books API

use crate::common::{create_admin_token, test_config, TestDb};
use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use profsite::routes;
use serde_json::{json, Value};

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

#[actix_web::test]
async fn test_book_slugs_are_unique() {
    let db = TestDb::new().await;
    let token = create_admin_token(&db.pool).await;
    let app = init_app!(db);

    let mut slugs = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/books")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "title": "Systems Thinking" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let body: Value = test::read_body_json(resp).await;
        slugs.push(body["slug"].as_str().unwrap().to_string());
    }

    assert_eq!(
        slugs,
        vec!["systems-thinking", "systems-thinking-1", "systems-thinking-2"]
    );
}

#[actix_web::test]
async fn test_get_book_by_slug() {
    let db = TestDb::new().await;
    let token = create_admin_token(&db.pool).await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "title": "A Field Guide", "slug": "field-guide" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::get()
        .uri("/api/books/field-guide")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "A Field Guide");

    let req = test::TestRequest::get().uri("/api/books/missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_unpublished_book_hidden() {
    let db = TestDb::new().await;
    let token = create_admin_token(&db.pool).await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "title": "Manuscript", "is_published": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::get().uri("/api/books").to_request();
    let resp = test::call_service(&app, req).await;
    let public: Vec<Value> = test::read_body_json(resp).await;
    assert!(public.is_empty());

    let req = test::TestRequest::get().uri("/api/books/manuscript").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri("/api/books/admin/all")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let all: Vec<Value> = test::read_body_json(resp).await;
    assert_eq!(all.len(), 1);
}

#[actix_web::test]
async fn test_books_follow_display_order() {
    let db = TestDb::new().await;
    let token = create_admin_token(&db.pool).await;
    let app = init_app!(db);

    for (title, order) in [("Second", 2), ("First", 1)] {
        let req = test::TestRequest::post()
            .uri("/api/books")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "title": title, "display_order": order }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
    }

    let req = test::TestRequest::get().uri("/api/books").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Vec<Value> = test::read_body_json(resp).await;
    let titles: Vec<&str> = body.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[actix_web::test]
async fn test_book_update_and_delete() {
    let db = TestDb::new().await;
    let token = create_admin_token(&db.pool).await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/books")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "title": "Draft Title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/books/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "title": "Final Title", "purchase_url": "ftp://shop" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/books/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "title": "Final Title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["title"], "Final Title");
    assert_eq!(updated["slug"], "draft-title");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/books/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
}
