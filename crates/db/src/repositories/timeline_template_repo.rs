//! Repository for the `timeline_templates` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::timeline_template::{
    CreateTimelineTemplate, TimelineTemplate, UpdateTimelineTemplate,
};

const COLUMNS: &str = "id, name, description, category, color, is_default, created_at, updated_at";

/// Provides CRUD operations for timeline templates.
pub struct TimelineTemplateRepo;

impl TimelineTemplateRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTimelineTemplate,
    ) -> Result<TimelineTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO timeline_templates (name, description, category, color) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineTemplate>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimelineTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timeline_templates WHERE id = $1");
        sqlx::query_as::<_, TimelineTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All templates, the default first, then by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<TimelineTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_templates ORDER BY is_default DESC, name, id"
        );
        sqlx::query_as::<_, TimelineTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a template. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimelineTemplate,
    ) -> Result<Option<TimelineTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE timeline_templates SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                color = COALESCE($5, color) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineTemplate>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Mark one template as the default, clearing the flag on all others.
    ///
    /// Returns `None` if the template does not exist; nothing is changed then.
    pub async fn set_default(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TimelineTemplate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE timeline_templates SET is_default = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let Some(template) = sqlx::query_as::<_, TimelineTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE timeline_templates SET is_default = false \
             WHERE id <> $1 AND is_default = true",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(template))
    }

    /// Delete a template and its items. Projects keep their timelines.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timeline_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
