//! Handlers for a project's timeline items, nested under
//! `/projects/{id}/timeline`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use portal_core::error::CoreError;
use portal_core::store::NewTimelineItem;
use portal_core::timeline;
use portal_core::types::DbId;
use portal_db::models::timeline_item::{CreateTimelineItem, TimelineItem, UpdateTimelineItem};
use portal_db::repositories::TimelineItemRepo;

use super::project::{ensure_project_managed, ensure_project_visible};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an item and check it belongs to `project_id`.
async fn ensure_item_in_project(
    pool: &sqlx::PgPool,
    project_id: DbId,
    id: DbId,
) -> AppResult<TimelineItem> {
    TimelineItemRepo::find_by_id(pool, id)
        .await?
        .filter(|item| item.project_id == project_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineItem",
            id,
        }))
}

fn parent_links(items: &[TimelineItem]) -> impl Iterator<Item = (DbId, Option<DbId>)> + '_ {
    items.iter().map(|item| (item.id, item.parent_id))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/timeline
// ---------------------------------------------------------------------------

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_project_visible(&state, &auth, project_id).await?;
    let items = TimelineItemRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/timeline
// ---------------------------------------------------------------------------

/// Add an ad-hoc item. It is appended after the last item unless `order`
/// is given.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTimelineItem>,
) -> AppResult<impl IntoResponse> {
    ensure_project_managed(&state, &auth, project_id).await?;
    timeline::validate_item_title(&input.title)?;

    let existing = TimelineItemRepo::list_by_project(&state.pool, project_id).await?;
    timeline::validate_new_parent(existing.iter().map(|item| item.id), input.parent_id)?;

    let order = match input.order {
        Some(order) => order,
        None => TimelineItemRepo::next_order(&state.pool, project_id).await?,
    };
    let new_item = NewTimelineItem {
        title: input.title.trim().to_string(),
        description: input.description,
        due_date: input.due_date,
        order,
        parent_id: input.parent_id,
    };
    let item = TimelineItemRepo::create(&state.pool, project_id, &new_item).await?;

    tracing::info!(
        project_id,
        item_id = item.id,
        user_id = auth.user_id,
        "Timeline item created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

// ---------------------------------------------------------------------------
// PUT /projects/{id}/timeline/{item_id}
// ---------------------------------------------------------------------------

/// Edit an item. A new parent must be another item of the same project
/// that is not below this one.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateTimelineItem>,
) -> AppResult<impl IntoResponse> {
    ensure_project_managed(&state, &auth, project_id).await?;
    ensure_item_in_project(&state.pool, project_id, id).await?;

    if let Some(title) = &input.title {
        timeline::validate_item_title(title)?;
        input.title = Some(title.trim().to_string());
    }
    if let Some(parent_id) = input.parent_id {
        let items = TimelineItemRepo::list_by_project(&state.pool, project_id).await?;
        timeline::validate_parent_assignment(parent_links(&items), id, parent_id)?;
    }

    let item = TimelineItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineItem",
            id,
        }))?;
    tracing::info!(project_id, item_id = id, user_id = auth.user_id, "Timeline item updated");
    Ok(Json(DataResponse { data: item }))
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/timeline/{item_id}/toggle
// ---------------------------------------------------------------------------

/// Flip an item's completion. Managers and team members may do this.
pub async fn toggle_completed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let project = ensure_project_visible(&state, &auth, project_id).await?;
    if !project.membership().can_contribute(auth.user_id, auth.is_admin()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Clients cannot change timeline items".into(),
        )));
    }
    ensure_item_in_project(&state.pool, project_id, id).await?;

    let item = TimelineItemRepo::toggle_completed(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineItem",
            id,
        }))?;
    tracing::debug!(project_id, item_id = id, completed = item.is_completed, "Timeline item toggled");
    Ok(Json(DataResponse { data: item }))
}

// ---------------------------------------------------------------------------
// DELETE /projects/{id}/timeline/{item_id}
// ---------------------------------------------------------------------------

/// Delete an item. Its children move up to the deleted item's parent.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_project_managed(&state, &auth, project_id).await?;
    ensure_item_in_project(&state.pool, project_id, id).await?;

    if !TimelineItemRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TimelineItem",
            id,
        }));
    }
    tracing::info!(project_id, item_id = id, user_id = auth.user_id, "Timeline item deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/timeline/{item_id}/parent-candidates
// ---------------------------------------------------------------------------

/// Items that may become the parent of `id` without creating a cycle.
pub async fn parent_candidates(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_project_visible(&state, &auth, project_id).await?;
    ensure_item_in_project(&state.pool, project_id, id).await?;

    let items = TimelineItemRepo::list_by_project(&state.pool, project_id).await?;
    let eligible = timeline::eligible_parents(parent_links(&items), id);
    let candidates: Vec<TimelineItem> = items
        .into_iter()
        .filter(|item| eligible.contains(&item.id))
        .collect();
    Ok(Json(DataResponse { data: candidates }))
}
