//! Repository for the `projects` table.

use portal_core::features::{FeatureKey, ProjectFeatures};
use portal_core::project::{STATUS_ACTIVE, STATUS_ARCHIVED};
use portal_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectFeatureRow, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, client_name, status, start_date, \
     features_enabled, project_manager_ids, team_member_ids, client_ids, template_id, \
     deleted_at, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// `features` and `manager_ids` are computed by the caller (seeded from
    /// global settings, creator included). Status defaults to `active`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProject,
        features: &ProjectFeatures,
        manager_ids: &[DbId],
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                (name, description, client_name, status, start_date, features_enabled, \
                 project_manager_ids, team_member_ids, client_ids, template_id) \
             VALUES ($1, $2, $3, COALESCE($4, '{STATUS_ACTIVE}'), $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.client_name)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(Json(features))
            .bind(manager_ids)
            .bind(&input.team_member_ids)
            .bind(&input.client_ids)
            .bind(input.template_id)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID. Excludes archived rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, most recently created first. `archived` selects
    /// archived rows instead of live ones.
    pub async fn list(pool: &PgPool, archived: bool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE (deleted_at IS NOT NULL) = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(archived)
            .fetch_all(pool)
            .await
    }

    /// List projects a user is attached to as manager, team member, or client.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        archived: bool,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE (deleted_at IS NOT NULL) = $2 \
               AND ($1 = ANY(project_manager_ids) \
                    OR $1 = ANY(team_member_ids) \
                    OR $1 = ANY(client_ids)) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(archived)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                client_name = COALESCE($4, client_name), \
                status = COALESCE($5, status), \
                start_date = COALESCE($6, start_date), \
                project_manager_ids = COALESCE($7, project_manager_ids), \
                team_member_ids = COALESCE($8, team_member_ids), \
                client_ids = COALESCE($9, client_ids) \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.client_name)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(&input.project_manager_ids)
            .bind(&input.team_member_ids)
            .bind(&input.client_ids)
            .fetch_optional(pool)
            .await
    }

    /// Archive (soft-delete) a project, moving it to the `archived` status.
    /// Returns `true` if a row was archived.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW(), status = $2 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(STATUS_ARCHIVED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore an archived project as `active`. Returns `true` if a row was
    /// restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NULL, status = $2 \
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .bind(STATUS_ACTIVE)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a project and its timeline. Returns `true` if a
    /// row was removed.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flag maps of every project, archived ones included.
    pub async fn list_feature_flags(pool: &PgPool) -> Result<Vec<ProjectFeatureRow>, sqlx::Error> {
        sqlx::query_as::<_, ProjectFeatureRow>(
            "SELECT id, features_enabled FROM projects ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    /// Set one key of a project's flag map, leaving other keys alone.
    /// Returns `true` if the project exists.
    pub async fn set_feature_flag(
        pool: &PgPool,
        id: DbId,
        key: FeatureKey,
        value: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects \
             SET features_enabled = jsonb_set(features_enabled, ARRAY[$2], to_jsonb($3::boolean), true) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(key.as_str())
        .bind(value)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
