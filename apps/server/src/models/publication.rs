use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Publication model - one entry of the research publication list
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Publication {
    pub id: i32,
    pub title: String,
    pub authors: String,
    pub venue: Option<String>,
    pub year: i32,
    pub doi: Option<String>,
    pub url: Option<String>,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a publication
#[derive(Debug, Deserialize)]
pub struct CreatePublication {
    pub title: String,
    pub authors: String,
    #[serde(default)]
    pub venue: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// DTO for updating a publication
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePublication {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub is_published: Option<bool>,
}
