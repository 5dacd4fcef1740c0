//! Handlers for the `/projects` resource and per-project feature flags.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use portal_core::cascade;
use portal_core::error::CoreError;
use portal_core::features::{self, FeatureKey, ProjectFeatures};
use portal_core::instantiation::{self, CloneReport};
use portal_core::project::{self as rules, managers_with_creator, normalize_member_ids};
use portal_core::timeline::resolve_start_date;
use portal_core::types::DbId;
use portal_db::models::project::{CreateProject, Project, UpdateProject};
use portal_db::repositories::{ProjectRepo, TimelineTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProjectListParams {
    /// List archived projects instead of live ones.
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetProjectFeatureRequest {
    pub enabled: bool,
}

/// A newly created project plus what happened to its timeline.
#[derive(Debug, Serialize)]
pub struct ProjectCreated {
    pub project: Project,
    /// Present when a template was requested and its items could be read.
    pub timeline: Option<CloneReport>,
    /// Set when the template could not be instantiated at all.
    pub timeline_error: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// Load a live project the user may see.
pub(crate) async fn ensure_project_visible(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !project.membership().can_view(user.user_id, user.is_admin()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this project".into(),
        )));
    }
    Ok(project)
}

/// Load a live project the user may change.
pub(crate) async fn ensure_project_managed(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Project> {
    let project = ensure_project_visible(state, user, id).await?;
    if !project.membership().can_manage(user.user_id, user.is_admin()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the project's managers can change it".into(),
        )));
    }
    Ok(project)
}

// ---------------------------------------------------------------------------
// POST /projects
// ---------------------------------------------------------------------------

/// Create a project, seeding its feature flags from the global settings and
/// optionally instantiating a timeline template.
///
/// Instantiation problems are logged and reported in the response; they
/// never fail the creation itself.
pub async fn create(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(mut input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    rules::validate_project_name(&input.name)?;
    if let Some(status) = &input.status {
        rules::validate_assignable_status(status)?;
    }
    input.name = input.name.trim().to_string();
    input.team_member_ids = normalize_member_ids(std::mem::take(&mut input.team_member_ids));
    input.client_ids = normalize_member_ids(std::mem::take(&mut input.client_ids));
    let managers = managers_with_creator(
        std::mem::take(&mut input.project_manager_ids),
        user.user_id,
    );

    if let Some(template_id) = input.template_id {
        TimelineTemplateRepo::find_by_id(&state.pool, template_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "TimelineTemplate",
                id: template_id,
            }))?;
    }

    let store = state.store();
    let settings = cascade::load_settings(&store).await?;
    let seeded = ProjectFeatures::seeded_from(&settings);

    let project = ProjectRepo::create(&state.pool, &input, &seeded, &managers).await?;
    tracing::info!(
        project_id = project.id,
        user_id = user.user_id,
        template_id = ?project.template_id,
        "Project created"
    );

    let (timeline, timeline_error) = match project.template_id {
        None => (None, None),
        Some(template_id) => {
            let today = chrono::Utc::now().date_naive();
            let start = resolve_start_date(project.start_date, today);
            match instantiation::instantiate_template(&store, template_id, project.id, start)
                .await
            {
                Ok(report) => (Some(report), None),
                Err(err) => {
                    tracing::warn!(
                        project_id = project.id,
                        template_id,
                        error = %err,
                        "Timeline template could not be instantiated"
                    );
                    (None, Some(err.to_string()))
                }
            }
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ProjectCreated {
                project,
                timeline,
                timeline_error,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /projects
// ---------------------------------------------------------------------------

/// Admins see every project; everyone else sees the projects they belong to.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<impl IntoResponse> {
    let projects = if auth.is_admin() {
        ProjectRepo::list(&state.pool, params.include_archived).await?
    } else {
        ProjectRepo::list_for_user(&state.pool, auth.user_id, params.include_archived).await?
    };
    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}
// ---------------------------------------------------------------------------

pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ensure_project_visible(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{id}
// ---------------------------------------------------------------------------

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    ensure_project_managed(&state, &auth, id).await?;

    if let Some(name) = &input.name {
        rules::validate_project_name(name)?;
        input.name = Some(name.trim().to_string());
    }
    if let Some(status) = &input.status {
        rules::validate_assignable_status(status)?;
    }
    input.project_manager_ids = input.project_manager_ids.map(normalize_member_ids);
    input.team_member_ids = input.team_member_ids.map(normalize_member_ids);
    input.client_ids = input.client_ids.map(normalize_member_ids);

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(project_id = id, user_id = auth.user_id, "Project updated");
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// DELETE /projects/{id}
// ---------------------------------------------------------------------------

/// Archive a project. It disappears from listings but keeps its data.
pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_project_managed(&state, &auth, id).await?;
    if !ProjectRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(project_id = id, user_id = auth.user_id, "Project archived");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/restore
// ---------------------------------------------------------------------------

pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ProjectRepo::restore(&state.pool, id).await? {
        return Err(not_found(id));
    }
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(project_id = id, user_id = admin.user_id, "Project restored");
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// DELETE /projects/{id}/permanent
// ---------------------------------------------------------------------------

/// Permanently delete a project and its timeline.
pub async fn hard_delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjectRepo::hard_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::warn!(project_id = id, user_id = admin.user_id, "Project permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/features
// ---------------------------------------------------------------------------

/// Effective feature map: a feature is on only if both the global switch
/// and the project's own flag allow it.
pub async fn get_features(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ensure_project_visible(&state, &auth, id).await?;
    let settings = cascade::load_settings(&state.store()).await?;
    let effective = features::effective_features(&settings, &project.features_enabled);
    Ok(Json(DataResponse { data: effective }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{id}/features/{key}
// ---------------------------------------------------------------------------

/// Switch one feature for a single project.
///
/// Global-only features have no project flag. A feature that is off
/// globally cannot be switched on for one project.
pub async fn set_feature(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, key)): Path<(DbId, String)>,
    Json(body): Json<SetProjectFeatureRequest>,
) -> AppResult<impl IntoResponse> {
    let key: FeatureKey = key.parse()?;
    ensure_project_managed(&state, &auth, id).await?;

    if !key.is_project_scoped() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Feature '{key}' is configured globally only"
        ))));
    }
    let settings = cascade::load_settings(&state.store()).await?;
    if body.enabled && !settings.flag(key) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Feature '{key}' is disabled globally"
        ))));
    }

    if !ProjectRepo::set_feature_flag(&state.pool, id, key, body.enabled).await? {
        return Err(not_found(id));
    }
    tracing::info!(
        project_id = id,
        feature = %key,
        enabled = body.enabled,
        user_id = auth.user_id,
        "Project feature flag set"
    );

    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let effective = features::effective_features(&settings, &project.features_enabled);
    Ok(Json(DataResponse { data: effective }))
}
