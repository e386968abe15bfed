use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// News model - a single news item, standalone or part of a group
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct News {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: NaiveDate,
    pub is_published: bool,
    pub group_id: Option<i32>,
    pub is_representative: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a news item sits in the grouping graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Membership {
    /// Standalone item or head of a group
    Representative,
    /// Member of the group headed by the given representative id
    Member(i32),
}

impl Membership {
    /// Column values (`is_representative`, `group_id`) for this membership
    pub fn columns(self) -> (bool, Option<i32>) {
        match self {
            Membership::Representative => (true, None),
            Membership::Member(rep_id) => (false, Some(rep_id)),
        }
    }

    pub fn is_representative(self) -> bool {
        matches!(self, Membership::Representative)
    }
}

impl News {
    /// The table CHECK constraint guarantees the two columns agree
    pub fn membership(&self) -> Membership {
        match self.group_id {
            Some(rep_id) if !self.is_representative => Membership::Member(rep_id),
            _ => Membership::Representative,
        }
    }
}

/// Row of the admin listing: every item plus the title of its representative
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NewsAdminRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub news: News,
    pub representative_title: Option<String>,
}

/// Public listing entry: a representative with its published members
#[derive(Debug, Clone, Serialize)]
pub struct NewsWithRelated {
    #[serde(flatten)]
    pub news: News,
    pub related_news: Vec<News>,
}

/// DTO for creating a news item
#[derive(Debug, Deserialize)]
pub struct CreateNews {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<NaiveDate>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// DTO for updating the display fields of a news item
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNews {
    pub title: Option<String>,
    pub content: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<NaiveDate>,
    pub is_published: Option<bool>,
}

/// Body of `PUT /api/news/{id}/group`; an explicit null `group_id` detaches
/// the item, a missing key is rejected
#[derive(Debug, Deserialize)]
pub struct SetNewsGroup {
    #[serde(deserialize_with = "required_nullable")]
    pub group_id: Option<i32>,
}

/// Key must be present; `null` is accepted
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer)
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
