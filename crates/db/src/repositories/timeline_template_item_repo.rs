//! Repository for the `timeline_template_items` table.

use portal_core::store::NewTemplateItem;
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::timeline_template::{TimelineTemplateItem, UpdateTemplateItem};

const COLUMNS: &str = "id, template_id, title, description, sort_order, default_offset_days, \
     parent_id, created_at, updated_at";

/// Provides CRUD operations for the items of a timeline template.
pub struct TimelineTemplateItemRepo;

impl TimelineTemplateItemRepo {
    pub async fn create(
        pool: &PgPool,
        template_id: DbId,
        item: &NewTemplateItem,
    ) -> Result<TimelineTemplateItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_template_items \
                (template_id, title, description, sort_order, default_offset_days, parent_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineTemplateItem>(&query)
            .bind(template_id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.order)
            .bind(item.default_offset_days)
            .bind(item.parent_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimelineTemplateItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_template_items WHERE id = $1");
        sqlx::query_as::<_, TimelineTemplateItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Items of a template in display order.
    pub async fn list_by_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<TimelineTemplateItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_template_items \
             WHERE template_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, TimelineTemplateItem>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// The order value that appends after the template's last item.
    pub async fn next_order(pool: &PgPool, template_id: DbId) -> Result<i32, sqlx::Error> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM timeline_template_items \
             WHERE template_id = $1",
        )
        .bind(template_id)
        .fetch_one(pool)
        .await?;
        Ok(next)
    }

    /// Update an item. `parent_id: Some(None)` moves it to the root.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplateItem,
    ) -> Result<Option<TimelineTemplateItem>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_template_items SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                sort_order = COALESCE($4, sort_order), \
                default_offset_days = COALESCE($5, default_offset_days), \
                parent_id = CASE WHEN $6 THEN $7 ELSE parent_id END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineTemplateItem>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.order)
            .bind(input.default_offset_days)
            .bind(input.parent_id.is_some())
            .bind(input.parent_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if the item exists.
    pub async fn set_parent(
        pool: &PgPool,
        id: DbId,
        parent_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE timeline_template_items SET parent_id = $2 WHERE id = $1")
            .bind(id)
            .bind(parent_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an item. Its children move up to the deleted item's parent.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE timeline_template_items AS child \
             SET parent_id = deleted.parent_id \
             FROM timeline_template_items AS deleted \
             WHERE deleted.id = $1 AND child.parent_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM timeline_template_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
