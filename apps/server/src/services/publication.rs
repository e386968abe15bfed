use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{CreatePublication, Publication, UpdatePublication};
use crate::pagination::{PageRequest, SortOrder};
use crate::services::validation::{optional_text, optional_url, required_text};

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

pub struct PublicationService;

impl PublicationService {
    /// One page of publications and the total matching count.
    ///
    /// `published_only` restricts the listing to what the public site shows.
    pub async fn list_page(
        pool: &PgPool,
        published_only: bool,
        year: Option<i32>,
        order: SortOrder,
        request: PageRequest,
    ) -> AppResult<(Vec<Publication>, i64)> {
        let total_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM publications
            WHERE (is_published OR NOT $1)
              AND ($2::int IS NULL OR year = $2)
            "#,
        )
        .bind(published_only)
        .bind(year)
        .fetch_one(pool)
        .await?;

        let query = format!(
            r#"
            SELECT * FROM publications
            WHERE (is_published OR NOT $1)
              AND ($2::int IS NULL OR year = $2)
            ORDER BY year {order}, id {order}
            LIMIT $3 OFFSET $4
            "#,
            order = order.as_sql()
        );

        let publications = sqlx::query_as::<_, Publication>(&query)
            .bind(published_only)
            .bind(year)
            .bind(request.per_page)
            .bind(request.offset())
            .fetch_all(pool)
            .await?;

        Ok((publications, total_count))
    }

    /// Gets a publication by ID
    pub async fn get_by_id(pool: &PgPool, id: i32) -> AppResult<Publication> {
        sqlx::query_as::<_, Publication>("SELECT * FROM publications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publication with id {} not found", id)))
    }

    /// Creates a new publication
    pub async fn create(pool: &PgPool, input: CreatePublication) -> AppResult<Publication> {
        let title = required_text("Title", &input.title, 1000)?;
        let authors = required_text("Authors", &input.authors, 2000)?;
        let year = validate_year(input.year)?;
        let url = optional_url("url", input.url.as_deref())?;

        let publication = sqlx::query_as::<_, Publication>(
            r#"
            INSERT INTO publications (title, authors, venue, year, doi, url, abstract, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(&authors)
        .bind(optional_text(input.venue.as_deref()))
        .bind(year)
        .bind(optional_text(input.doi.as_deref()))
        .bind(&url)
        .bind(optional_text(input.abstract_text.as_deref()))
        .bind(input.is_published.unwrap_or(true))
        .fetch_one(pool)
        .await?;

        Ok(publication)
    }

    /// Updates an existing publication
    pub async fn update(
        pool: &PgPool,
        id: i32,
        input: UpdatePublication,
    ) -> AppResult<Publication> {
        let current = Self::get_by_id(pool, id).await?;

        let title = match input.title {
            Some(ref v) => required_text("Title", v, 1000)?,
            None => current.title,
        };
        let authors = match input.authors {
            Some(ref v) => required_text("Authors", v, 2000)?,
            None => current.authors,
        };
        let year = match input.year {
            Some(v) => validate_year(v)?,
            None => current.year,
        };
        let url = match input.url {
            Some(ref v) => optional_url("url", Some(v))?,
            None => current.url,
        };
        let venue = input
            .venue
            .as_deref()
            .map_or(current.venue, |v| optional_text(Some(v)));
        let doi = input
            .doi
            .as_deref()
            .map_or(current.doi, |v| optional_text(Some(v)));
        let abstract_text = input
            .abstract_text
            .as_deref()
            .map_or(current.abstract_text, |v| optional_text(Some(v)));

        let publication = sqlx::query_as::<_, Publication>(
            r#"
            UPDATE publications
            SET title = $2, authors = $3, venue = $4, year = $5, doi = $6, url = $7,
                abstract = $8, is_published = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&title)
        .bind(&authors)
        .bind(&venue)
        .bind(year)
        .bind(&doi)
        .bind(&url)
        .bind(&abstract_text)
        .bind(input.is_published.unwrap_or(current.is_published))
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Publication with id {} not found", id)))?;

        Ok(publication)
    }

    /// Deletes a publication
    pub async fn delete(pool: &PgPool, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Publication with id {} not found",
                id
            )));
        }

        Ok(())
    }
}

fn validate_year(year: i32) -> AppResult<i32> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::Validation(format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(year)
}
