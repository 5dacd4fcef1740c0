//! Repository for the `timeline_items` table.

use portal_core::store::NewTimelineItem;
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::timeline_item::{TimelineItem, UpdateTimelineItem};

const COLUMNS: &str = "id, project_id, title, description, due_date, is_completed, sort_order, \
     parent_id, created_at, updated_at";

/// Provides CRUD operations for project timeline items.
pub struct TimelineItemRepo;

impl TimelineItemRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        item: &NewTimelineItem,
    ) -> Result<TimelineItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_items \
                (project_id, title, description, due_date, sort_order, parent_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineItem>(&query)
            .bind(project_id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.due_date)
            .bind(item.order)
            .bind(item.parent_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TimelineItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_items WHERE id = $1");
        sqlx::query_as::<_, TimelineItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A project's timeline in display order.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<TimelineItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_items \
             WHERE project_id = $1 \
             ORDER BY sort_order, due_date, id"
        );
        sqlx::query_as::<_, TimelineItem>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn next_order(pool: &PgPool, project_id: DbId) -> Result<i32, sqlx::Error> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM timeline_items WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(next)
    }

    /// Update an item. `parent_id: Some(None)` moves it to the root.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimelineItem,
    ) -> Result<Option<TimelineItem>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_items SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                due_date = COALESCE($4, due_date), \
                is_completed = COALESCE($5, is_completed), \
                sort_order = COALESCE($6, sort_order), \
                parent_id = CASE WHEN $7 THEN $8 ELSE parent_id END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineItem>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.due_date)
            .bind(input.is_completed)
            .bind(input.order)
            .bind(input.parent_id.is_some())
            .bind(input.parent_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Flip the completion flag.
    pub async fn toggle_completed(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimelineItem>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_items SET is_completed = NOT is_completed \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_parent(
        pool: &PgPool,
        id: DbId,
        parent_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE timeline_items SET parent_id = $2 WHERE id = $1")
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
            "UPDATE timeline_items AS child \
             SET parent_id = deleted.parent_id \
             FROM timeline_items AS deleted \
             WHERE deleted.id = $1 AND child.parent_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM timeline_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
