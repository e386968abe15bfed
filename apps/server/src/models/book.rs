use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Book model for the book showcase
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub cover_image_url: Option<String>,
    pub purchase_url: Option<String>,
    pub display_order: i32,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a book
#[derive(Debug, Deserialize)]
pub struct CreateBook {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub purchase_url: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// DTO for updating a book; the slug is fixed once created
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub cover_image_url: Option<String>,
    pub purchase_url: Option<String>,
    pub display_order: Option<i32>,
    pub is_published: Option<bool>,
}
