//! Offset pagination for the publication listings

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// A validated page window: `page` is 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Clamps client input into range instead of rejecting it
    pub fn clamped(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Saturates for absurd page numbers; such a page is simply empty
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the totals the frontend pager needs
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page: request.page,
            per_page: request.per_page,
            total_pages: (total_count + request.per_page - 1) / request.per_page,
        }
    }
}

/// Direction of the year ordering
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// `?page=&per_page=&order=&year=` of the publication listings
#[derive(Debug, Deserialize)]
pub struct ListPublicationsQuery {
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    /// Newest first unless `asc`
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub year: Option<i32>,
}

impl ListPublicationsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::clamped(self.page, self.per_page)
    }
}

fn first_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}
