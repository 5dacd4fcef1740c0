//! Handlers for timeline templates and their items.
//!
//! Managers may read templates (they pick one when creating a project);
//! only admins may change them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use portal_core::error::CoreError;
use portal_core::instantiation::{self, CloneReport};
use portal_core::store::NewTemplateItem;
use portal_core::template as rules;
use portal_core::timeline;
use portal_core::types::DbId;
use portal_db::models::timeline_template::{
    CreateTemplateItem, CreateTimelineTemplate, TimelineTemplate, TimelineTemplateItem,
    UpdateTemplateItem, UpdateTimelineTemplate,
};
use portal_db::repositories::{TimelineTemplateItemRepo, TimelineTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TemplateWithItems {
    #[serde(flatten)]
    pub template: TimelineTemplate,
    pub items: Vec<TimelineTemplateItem>,
}

#[derive(Debug, Serialize)]
pub struct TemplateDuplicated {
    pub template: TimelineTemplate,
    pub items: CloneReport,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_template_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<TimelineTemplate> {
    TimelineTemplateRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplate",
            id,
        }))
}

async fn ensure_item_in_template(
    pool: &sqlx::PgPool,
    template_id: DbId,
    id: DbId,
) -> AppResult<TimelineTemplateItem> {
    TimelineTemplateItemRepo::find_by_id(pool, id)
        .await?
        .filter(|item| item.template_id == template_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplateItem",
            id,
        }))
}

fn validate_optional_fields(category: Option<&str>, color: Option<&str>) -> AppResult<()> {
    if let Some(category) = category {
        rules::validate_category(category)?;
    }
    if let Some(color) = color {
        rules::validate_color(color)?;
    }
    Ok(())
}

fn parent_links(
    items: &[TimelineTemplateItem],
) -> impl Iterator<Item = (DbId, Option<DbId>)> + '_ {
    items.iter().map(|item| (item.id, item.parent_id))
}

/* --------------------------------------------------------------------------
   Templates
   -------------------------------------------------------------------------- */

/// GET /templates
pub async fn list(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
) -> AppResult<impl IntoResponse> {
    let templates = TimelineTemplateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// POST /templates
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateTimelineTemplate>,
) -> AppResult<impl IntoResponse> {
    rules::validate_template_name(&input.name)?;
    validate_optional_fields(input.category.as_deref(), input.color.as_deref())?;

    let template = TimelineTemplateRepo::create(&state.pool, &input).await?;
    tracing::info!(template_id = template.id, user_id = admin.user_id, "Template created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /templates/{id} -- the template with its items in display order.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state.pool, id).await?;
    let items = TimelineTemplateItemRepo::list_by_template(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: TemplateWithItems { template, items },
    }))
}

/// PUT /templates/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimelineTemplate>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        rules::validate_template_name(name)?;
    }
    validate_optional_fields(input.category.as_deref(), input.color.as_deref())?;

    let template = TimelineTemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplate",
            id,
        }))?;
    tracing::info!(template_id = id, user_id = admin.user_id, "Template updated");
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /templates/{id} -- removes the template and its items. Projects
/// created from it keep their timelines.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TimelineTemplateRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplate",
            id,
        }));
    }
    tracing::info!(template_id = id, user_id = admin.user_id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /templates/{id}/default -- make this the only default template.
pub async fn set_default(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TimelineTemplateRepo::set_default(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplate",
            id,
        }))?;
    tracing::info!(template_id = id, user_id = admin.user_id, "Default template set");
    Ok(Json(DataResponse { data: template }))
}

/// POST /templates/{id}/duplicate
///
/// Creates `"<name> (Copy)"` (never the default) and clones the item tree
/// into it. Item failures are reported, not raised.
pub async fn duplicate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let source = ensure_template_exists(&state.pool, id).await?;

    let copy = CreateTimelineTemplate {
        name: rules::copy_name(&source.name),
        description: source.description.clone(),
        category: source.category.clone(),
        color: source.color.clone(),
    };
    let template = TimelineTemplateRepo::create(&state.pool, &copy).await?;
    let items = instantiation::duplicate_template_items(&state.store(), id, template.id).await?;

    tracing::info!(
        source_template_id = id,
        template_id = template.id,
        items = items.created.len(),
        user_id = admin.user_id,
        "Template duplicated"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: TemplateDuplicated { template, items },
        }),
    ))
}

/* --------------------------------------------------------------------------
   Template items
   -------------------------------------------------------------------------- */

/// GET /templates/{id}/items
pub async fn list_items(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path(template_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_template_exists(&state.pool, template_id).await?;
    let items = TimelineTemplateItemRepo::list_by_template(&state.pool, template_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /templates/{id}/items
pub async fn create_item(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(template_id): Path<DbId>,
    Json(input): Json<CreateTemplateItem>,
) -> AppResult<impl IntoResponse> {
    ensure_template_exists(&state.pool, template_id).await?;
    timeline::validate_item_title(&input.title)?;
    if let Some(offset) = input.default_offset_days {
        timeline::validate_offset_days(offset)?;
    }

    let existing = TimelineTemplateItemRepo::list_by_template(&state.pool, template_id).await?;
    timeline::validate_new_parent(existing.iter().map(|item| item.id), input.parent_id)?;

    let order = match input.order {
        Some(order) => order,
        None => TimelineTemplateItemRepo::next_order(&state.pool, template_id).await?,
    };
    let new_item = NewTemplateItem {
        title: input.title.trim().to_string(),
        description: input.description,
        order,
        default_offset_days: input.default_offset_days,
        parent_id: input.parent_id,
    };
    let item = TimelineTemplateItemRepo::create(&state.pool, template_id, &new_item).await?;

    tracing::info!(
        template_id,
        item_id = item.id,
        user_id = admin.user_id,
        "Template item created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /templates/{id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((template_id, item_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateTemplateItem>,
) -> AppResult<impl IntoResponse> {
    ensure_item_in_template(&state.pool, template_id, item_id).await?;

    if let Some(title) = &input.title {
        timeline::validate_item_title(title)?;
        input.title = Some(title.trim().to_string());
    }
    if let Some(offset) = input.default_offset_days {
        timeline::validate_offset_days(offset)?;
    }
    if let Some(parent_id) = input.parent_id {
        let items = TimelineTemplateItemRepo::list_by_template(&state.pool, template_id).await?;
        timeline::validate_parent_assignment(parent_links(&items), item_id, parent_id)?;
    }

    let item = TimelineTemplateItemRepo::update(&state.pool, item_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplateItem",
            id: item_id,
        }))?;
    tracing::info!(template_id, item_id, user_id = admin.user_id, "Template item updated");
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /templates/{id}/items/{item_id} -- children move up a level.
pub async fn delete_item(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((template_id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_item_in_template(&state.pool, template_id, item_id).await?;
    if !TimelineTemplateItemRepo::delete(&state.pool, item_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "TimelineTemplateItem",
            id: item_id,
        }));
    }
    tracing::info!(template_id, item_id, user_id = admin.user_id, "Template item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /templates/{id}/items/{item_id}/parent-candidates
pub async fn parent_candidates(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path((template_id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_item_in_template(&state.pool, template_id, item_id).await?;

    let items = TimelineTemplateItemRepo::list_by_template(&state.pool, template_id).await?;
    let eligible = timeline::eligible_parents(parent_links(&items), item_id);
    let candidates: Vec<TimelineTemplateItem> = items
        .into_iter()
        .filter(|item| eligible.contains(&item.id))
        .collect();
    Ok(Json(DataResponse { data: candidates }))
}
