use actix_web::{web, HttpResponse};

use crate::auth::BearerAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreatePublication, UpdatePublication};
use crate::pagination::{ListPublicationsQuery, Page};
use crate::services::PublicationService;

/// GET /api/publications - Published publications with pagination
pub async fn list_publications(
    pool: web::Data<DbPool>,
    query: web::Query<ListPublicationsQuery>,
) -> AppResult<HttpResponse> {
    list_page(pool.get_ref(), &query, true).await
}

/// GET /api/publications/admin/all - All publications including drafts
pub async fn list_all_publications(
    pool: web::Data<DbPool>,
    query: web::Query<ListPublicationsQuery>,
    _auth: BearerAuth,
) -> AppResult<HttpResponse> {
    list_page(pool.get_ref(), &query, false).await
}

async fn list_page(
    pool: &DbPool,
    query: &ListPublicationsQuery,
    published_only: bool,
) -> AppResult<HttpResponse> {
    let request = query.page_request();
    let (publications, total_count) =
        PublicationService::list_page(pool, published_only, query.year, query.order, request)
            .await?;

    Ok(HttpResponse::Ok().json(Page::new(publications, total_count, request)))
}

/// POST /api/publications - Create a publication
pub async fn create_publication(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    body: web::Json<CreatePublication>,
) -> AppResult<HttpResponse> {
    let publication = PublicationService::create(pool.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(publication))
}

/// PUT /api/publications/{id} - Update a publication
pub async fn update_publication(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
    body: web::Json<UpdatePublication>,
) -> AppResult<HttpResponse> {
    let publication =
        PublicationService::update(pool.get_ref(), path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(publication))
}

/// DELETE /api/publications/{id} - Delete a publication
pub async fn delete_publication(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    PublicationService::delete(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure publication routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/publications")
            .route("", web::get().to(list_publications))
            .route("", web::post().to(create_publication))
            .route("/admin/all", web::get().to(list_all_publications))
            .route("/{id}", web::put().to(update_publication))
            .route("/{id}", web::delete().to(delete_publication)),
    );
}
