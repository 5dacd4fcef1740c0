//! Project entity model and DTOs.

use portal_core::features::ProjectFeatures;
use portal_core::project::Membership;
use portal_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub status: String,
    pub start_date: Option<Date>,
    pub features_enabled: Json<ProjectFeatures>,
    pub project_manager_ids: Vec<DbId>,
    pub team_member_ids: Vec<DbId>,
    pub client_ids: Vec<DbId>,
    pub template_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn membership(&self) -> Membership<'_> {
        Membership {
            project_manager_ids: &self.project_manager_ids,
            team_member_ids: &self.team_member_ids,
            client_ids: &self.client_ids,
        }
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    /// Defaults to `active` if omitted.
    pub status: Option<String>,
    pub start_date: Option<Date>,
    #[serde(default)]
    pub project_manager_ids: Vec<DbId>,
    #[serde(default)]
    pub team_member_ids: Vec<DbId>,
    #[serde(default)]
    pub client_ids: Vec<DbId>,
    /// Timeline template to instantiate after the project is created.
    pub template_id: Option<DbId>,
}

/// DTO for updating an existing project. All fields are optional.
///
/// Feature flags are not patched here; they change through the feature
/// endpoints so the global gate is respected.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<Date>,
    pub project_manager_ids: Option<Vec<DbId>>,
    pub team_member_ids: Option<Vec<DbId>>,
    pub client_ids: Option<Vec<DbId>>,
}

/// Just the flag map of a project, as read by the feature cascade.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectFeatureRow {
    pub id: DbId,
    pub features_enabled: Json<ProjectFeatures>,
}
