use actix_web::{web, HttpResponse};

use crate::auth::BearerAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateBook, UpdateBook};
use crate::services::BookService;

/// GET /api/books - Published books in showcase order
pub async fn list_books(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let books = BookService::list(pool.get_ref(), true).await?;

    Ok(HttpResponse::Ok().json(books))
}

/// GET /api/books/admin/all - All books including drafts
pub async fn list_all_books(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
) -> AppResult<HttpResponse> {
    let books = BookService::list(pool.get_ref(), false).await?;

    Ok(HttpResponse::Ok().json(books))
}

/// GET /api/books/{slug} - A published book
///
/// Shares the `/{id}` resource with update/delete; the segment is a slug here.
pub async fn get_book(pool: web::Data<DbPool>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let book = BookService::get_published_by_slug(pool.get_ref(), &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(book))
}

/// POST /api/books - Create a book
pub async fn create_book(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    body: web::Json<CreateBook>,
) -> AppResult<HttpResponse> {
    let book = BookService::create(pool.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(book))
}

/// PUT /api/books/{id} - Update a book
pub async fn update_book(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
    body: web::Json<UpdateBook>,
) -> AppResult<HttpResponse> {
    let book = BookService::update(pool.get_ref(), path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(book))
}

/// DELETE /api/books/{id} - Delete a book
pub async fn delete_book(
    pool: web::Data<DbPool>,
    _auth: BearerAuth,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    BookService::delete(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure book routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/books")
            .route("", web::get().to(list_books))
            .route("", web::post().to(create_book))
            .route("/admin/all", web::get().to(list_all_books))
            .route("/{id}", web::get().to(get_book))
            .route("/{id}", web::put().to(update_book))
            .route("/{id}", web::delete().to(delete_book)),
    );
}
