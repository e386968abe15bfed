use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::models::{CreateNews, Membership, News, NewsAdminRow, NewsWithRelated, UpdateNews};
use crate::services::grouping::{
    aggregate_groups, plan_assignment, plan_delete, plan_promotion, GroupNode, GroupingError,
    MembershipChange,
};
use crate::services::validation::{optional_text, optional_url, required_text};

/// Advisory lock key serializing every grouping mutation.
/// Admin edits are rare, one lock for the whole table is enough.
const NEWS_GROUPING_LOCK_KEY: i64 = 0x6e65_7773;

const MAX_TITLE_LEN: usize = 500;

pub struct NewsService;

impl NewsService {
    /// Published representatives, each with its published members.
    ///
    /// Both reads share one REPEATABLE READ snapshot so an item promoted
    /// concurrently never shows up twice.
    pub async fn list_public(pool: &PgPool) -> AppResult<Vec<NewsWithRelated>> {
        let mut tx = pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let representatives = sqlx::query_as::<_, News>(
            r#"
            SELECT * FROM news
            WHERE is_published AND is_representative
            ORDER BY published_at DESC, id DESC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let rep_ids: Vec<i32> = representatives.iter().map(|n| n.id).collect();

        let members = sqlx::query_as::<_, News>(
            r#"
            SELECT * FROM news
            WHERE is_published AND NOT is_representative
              AND group_id = ANY($1)
            ORDER BY published_at DESC, id DESC
            "#,
        )
        .bind(&rep_ids)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(aggregate_groups(representatives, members))
    }

    /// Every news row with the title of its representative (admin listing)
    pub async fn list_admin(pool: &PgPool) -> AppResult<Vec<NewsAdminRow>> {
        let rows = sqlx::query_as::<_, NewsAdminRow>(
            r#"
            SELECT n.*, r.title AS representative_title
            FROM news n
            LEFT JOIN news r ON r.id = n.group_id
            ORDER BY n.published_at DESC, n.id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Gets a news item by ID, published or not
    pub async fn get_by_id(pool: &PgPool, id: i32) -> AppResult<News> {
        sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| GroupingError::NotFound(id).into())
    }

    /// Gets a news item visible on the public site
    pub async fn get_published(pool: &PgPool, id: i32) -> AppResult<News> {
        let news = Self::get_by_id(pool, id).await?;
        if !news.is_published {
            return Err(GroupingError::NotFound(id).into());
        }
        Ok(news)
    }

    /// Creates a news item. New items always start as standalone representatives.
    pub async fn create(pool: &PgPool, input: CreateNews) -> AppResult<News> {
        let title = required_text("Title", &input.title, MAX_TITLE_LEN)?;
        let source_url = optional_url("source_url", input.source_url.as_deref())?;
        let image_url = optional_url("image_url", input.image_url.as_deref())?;
        let published_at = input
            .published_at
            .unwrap_or_else(|| Utc::now().date_naive());

        let news = sqlx::query_as::<_, News>(
            r#"
            INSERT INTO news (title, content, source, source_url, image_url,
                              published_at, is_published, group_id, is_representative)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, TRUE)
            RETURNING *
            "#,
        )
        .bind(&title)
        .bind(optional_text(input.content.as_deref()))
        .bind(optional_text(input.source.as_deref()))
        .bind(&source_url)
        .bind(&image_url)
        .bind(published_at)
        .bind(input.is_published.unwrap_or(true))
        .fetch_one(pool)
        .await?;

        log::info!("Created news {} ({})", news.id, news.title);
        Ok(news)
    }

    /// Updates display fields. Grouping columns are only touched by the
    /// grouping operations.
    pub async fn update(pool: &PgPool, id: i32, input: UpdateNews) -> AppResult<News> {
        let current = Self::get_by_id(pool, id).await?;

        let title = match input.title {
            Some(ref title) => required_text("Title", title, MAX_TITLE_LEN)?,
            None => current.title,
        };
        let content = match input.content {
            Some(ref v) => optional_text(Some(v)),
            None => current.content,
        };
        let source = match input.source {
            Some(ref v) => optional_text(Some(v)),
            None => current.source,
        };
        let source_url = match input.source_url {
            Some(ref v) => optional_url("source_url", Some(v))?,
            None => current.source_url,
        };
        let image_url = match input.image_url {
            Some(ref v) => optional_url("image_url", Some(v))?,
            None => current.image_url,
        };

        let news = sqlx::query_as::<_, News>(
            r#"
            UPDATE news
            SET title = $2, content = $3, source = $4, source_url = $5, image_url = $6,
                published_at = $7, is_published = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&title)
        .bind(&content)
        .bind(&source)
        .bind(&source_url)
        .bind(&image_url)
        .bind(input.published_at.unwrap_or(current.published_at))
        .bind(input.is_published.unwrap_or(current.is_published))
        .fetch_optional(pool)
        .await?
        .ok_or(GroupingError::NotFound(id))?;

        Ok(news)
    }

    /// Attaches `id` to the group headed by `group_id`, or detaches it when
    /// `group_id` is `None`. Members of `id` follow it into the new group.
    pub async fn set_group(pool: &PgPool, id: i32, group_id: Option<i32>) -> AppResult<News> {
        let mut tx = Self::begin_grouping(pool).await?;

        match Self::set_group_inner(&mut tx, id, group_id).await {
            Ok(news) => {
                tx.commit().await?;
                Ok(news)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    async fn set_group_inner(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        group_id: Option<i32>,
    ) -> AppResult<News> {
        if group_id == Some(id) {
            return Err(GroupingError::SelfAssignment(id).into());
        }

        let item = load_node(tx, id).await?.ok_or(GroupingError::NotFound(id))?;
        let target = match group_id {
            Some(group_id) => load_node(tx, group_id).await?,
            None => None,
        };

        let changes = plan_assignment(&item, group_id, target.as_ref())?;
        apply_changes(tx, &changes).await?;

        if !changes.is_empty() {
            match group_id {
                Some(group_id) => log::info!(
                    "News {} assigned to group {} ({} member(s) moved along)",
                    id,
                    group_id,
                    item.members.len()
                ),
                None => log::info!("News {} detached from its group", id),
            }
        }

        fetch_news(tx, id).await
    }

    /// Makes `id` the representative of its group. The old representative and
    /// every other member are re-pointed at `id` in the same transaction.
    pub async fn set_representative(pool: &PgPool, id: i32) -> AppResult<News> {
        let mut tx = Self::begin_grouping(pool).await?;

        match Self::set_representative_inner(&mut tx, id).await {
            Ok(news) => {
                tx.commit().await?;
                Ok(news)
            }
            Err(e) => {
                // Nothing of a half-applied promotion may survive
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    async fn set_representative_inner(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<News> {
        let item = load_node(tx, id).await?.ok_or(GroupingError::NotFound(id))?;

        let old_rep = match item.membership {
            Membership::Member(rep_id) => load_node(tx, rep_id).await?,
            Membership::Representative => None,
        };

        let changes = plan_promotion(&item, old_rep.as_ref())?;
        apply_changes(tx, &changes).await?;

        if let Some(old_rep) = old_rep {
            log::info!(
                "News {} promoted to representative, replacing {}",
                id,
                old_rep.id
            );
        }

        fetch_news(tx, id).await
    }

    /// Deletes a news item. Its members become independent representatives.
    pub async fn delete(pool: &PgPool, id: i32) -> AppResult<()> {
        let mut tx = Self::begin_grouping(pool).await?;

        match Self::delete_inner(&mut tx, id).await {
            Ok(()) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    async fn delete_inner(tx: &mut Transaction<'_, Postgres>, id: i32) -> AppResult<()> {
        let item = load_node(tx, id).await?.ok_or(GroupingError::NotFound(id))?;

        let changes = plan_delete(&item);
        apply_changes(tx, &changes).await?;

        sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        log::info!(
            "Deleted news {} ({} member(s) detached)",
            id,
            changes.len()
        );
        Ok(())
    }

    /// Starts a transaction holding the grouping lock until commit/rollback
    async fn begin_grouping(pool: &PgPool) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(NEWS_GROUPING_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Loads a row and the ids grouped under it, locking the row until the
/// transaction ends
async fn load_node(tx: &mut Transaction<'_, Postgres>, id: i32) -> AppResult<Option<GroupNode>> {
    let news = sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    let Some(news) = news else {
        return Ok(None);
    };

    let members: Vec<i32> =
        sqlx::query_scalar("SELECT id FROM news WHERE group_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&mut **tx)
            .await?;

    Ok(Some(GroupNode {
        id: news.id,
        membership: news.membership(),
        members,
    }))
}

async fn apply_changes(
    tx: &mut Transaction<'_, Postgres>,
    changes: &[MembershipChange],
) -> AppResult<()> {
    for change in changes {
        let (is_representative, group_id) = change.membership.columns();
        let result = sqlx::query(
            r#"
            UPDATE news
            SET is_representative = $2, group_id = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(change.id)
        .bind(is_representative)
        .bind(group_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() != 1 {
            return Err(AppError::Internal(format!(
                "News {} vanished while regrouping",
                change.id
            )));
        }
    }

    Ok(())
}

async fn fetch_news(tx: &mut Transaction<'_, Postgres>, id: i32) -> AppResult<News> {
    sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| GroupingError::NotFound(id).into())
}
