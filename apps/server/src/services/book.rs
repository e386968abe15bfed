use slug::slugify;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Book, CreateBook, UpdateBook};
use crate::services::validation::{optional_text, optional_url, required_text};

pub struct BookService;

impl BookService {
    /// Lists books in showcase order
    pub async fn list(pool: &PgPool, published_only: bool) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE is_published OR NOT $1
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .bind(published_only)
        .fetch_all(pool)
        .await?;

        Ok(books)
    }

    /// Gets a book by ID
    pub async fn get_by_id(pool: &PgPool, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Gets a published book by slug
    pub async fn get_published_by_slug(pool: &PgPool, slug: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE slug = $1 AND is_published")
            .bind(slug)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book '{}' not found", slug)))
    }

    /// Creates a new book
    pub async fn create(pool: &PgPool, input: CreateBook) -> AppResult<Book> {
        let title = required_text("Title", &input.title, 500)?;
        let cover_image_url = optional_url("cover_image_url", input.cover_image_url.as_deref())?;
        let purchase_url = optional_url("purchase_url", input.purchase_url.as_deref())?;

        let slug = Self::generate_unique_slug(pool, &title, input.slug.as_deref()).await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, slug, subtitle, description, publisher, published_year,
                               cover_image_url, purchase_url, display_order, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(&slug)
        .bind(optional_text(input.subtitle.as_deref()))
        .bind(optional_text(input.description.as_deref()))
        .bind(optional_text(input.publisher.as_deref()))
        .bind(input.published_year)
        .bind(&cover_image_url)
        .bind(&purchase_url)
        .bind(input.display_order.unwrap_or(0))
        .bind(input.is_published.unwrap_or(true))
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("books_slug_key") {
                    return AppError::Conflict(format!("Book with slug '{}' already exists", slug));
                }
            }
            AppError::Database(e)
        })?;

        Ok(book)
    }

    /// Updates an existing book
    pub async fn update(pool: &PgPool, id: i32, input: UpdateBook) -> AppResult<Book> {
        let current = Self::get_by_id(pool, id).await?;

        let title = match input.title {
            Some(ref v) => required_text("Title", v, 500)?,
            None => current.title,
        };
        let cover_image_url = match input.cover_image_url {
            Some(ref v) => optional_url("cover_image_url", Some(v))?,
            None => current.cover_image_url,
        };
        let purchase_url = match input.purchase_url {
            Some(ref v) => optional_url("purchase_url", Some(v))?,
            None => current.purchase_url,
        };
        let subtitle = input
            .subtitle
            .as_deref()
            .map_or(current.subtitle, |v| optional_text(Some(v)));
        let description = input
            .description
            .as_deref()
            .map_or(current.description, |v| optional_text(Some(v)));
        let publisher = input
            .publisher
            .as_deref()
            .map_or(current.publisher, |v| optional_text(Some(v)));

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, subtitle = $3, description = $4, publisher = $5,
                published_year = $6, cover_image_url = $7, purchase_url = $8,
                display_order = $9, is_published = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&title)
        .bind(&subtitle)
        .bind(&description)
        .bind(&publisher)
        .bind(input.published_year.or(current.published_year))
        .bind(&cover_image_url)
        .bind(&purchase_url)
        .bind(input.display_order.unwrap_or(current.display_order))
        .bind(input.is_published.unwrap_or(current.is_published))
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(book)
    }

    /// Deletes a book
    pub async fn delete(pool: &PgPool, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Generates a unique slug based on the title
    async fn generate_unique_slug(
        pool: &PgPool,
        title: &str,
        custom_slug: Option<&str>,
    ) -> AppResult<String> {
        let base_slug = match custom_slug {
            Some(s) if !s.trim().is_empty() => slugify(s.trim()),
            _ => slugify(title),
        };

        if base_slug.is_empty() {
            return Err(AppError::Validation(
                "Cannot generate valid slug from title".to_string(),
            ));
        }

        let similar_slugs: Vec<String> =
            sqlx::query_scalar("SELECT slug FROM books WHERE slug LIKE $1 || '%'")
                .bind(&base_slug)
                .fetch_all(pool)
                .await?;

        Ok(next_free_slug(&base_slug, &similar_slugs))
    }
}

/// First of `base`, `base-1`, `base-2`, ... not in `taken`
pub fn next_free_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }

    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
