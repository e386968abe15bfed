use actix_web::{web, HttpResponse};

use crate::auth::BearerAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateNews, MessageResponse, SetNewsGroup, UpdateNews};
use crate::services::NewsService;

/// GET /api/news - Published representatives with their related news
pub async fn list_news(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let news = NewsService::list_public(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(news))
}

/// GET /api/news/admin/all - Every news row, flat, with representative titles
pub async fn list_all_news(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
) -> AppResult<HttpResponse> {
    let rows = NewsService::list_admin(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/news/{id} - A single published news item
pub async fn get_news(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let news = NewsService::get_published(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(news))
}

/// POST /api/news - Create a news item
pub async fn create_news(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    body: web::Json<CreateNews>,
) -> AppResult<HttpResponse> {
    let news = NewsService::create(pool.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(news))
}

/// PUT /api/news/{id} - Update display fields of a news item
pub async fn update_news(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
    body: web::Json<UpdateNews>,
) -> AppResult<HttpResponse> {
    let news = NewsService::update(pool.get_ref(), path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(news))
}

/// PUT /api/news/{id}/group - Attach to a representative's group, or detach with null
pub async fn set_news_group(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
    body: web::Json<SetNewsGroup>,
) -> AppResult<HttpResponse> {
    let news = NewsService::set_group(pool.get_ref(), path.into_inner(), body.group_id).await?;

    Ok(HttpResponse::Ok().json(news))
}

/// PUT /api/news/{id}/set-representative - Promote a member to head its group
pub async fn set_news_representative(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let news = NewsService::set_representative(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(news))
}

/// DELETE /api/news/{id} - Delete a news item, detaching its members
pub async fn delete_news(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    NewsService::delete(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "News deleted".to_string(),
    }))
}

/// Configure news routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/news")
            .route("", web::get().to(list_news))
            .route("", web::post().to(create_news))
            .route("/admin/all", web::get().to(list_all_news))
            .route("/{id}", web::get().to(get_news))
            .route("/{id}", web::put().to(update_news))
            .route("/{id}", web::delete().to(delete_news))
            .route("/{id}/group", web::put().to(set_news_group))
            .route(
                "/{id}/set-representative",
                web::put().to(set_news_representative),
            ),
    );
}
