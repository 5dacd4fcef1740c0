//! Handlers for global feature settings and the feature toggle cascade.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use portal_core::cascade::{self, ToggleOutcome};
use portal_core::features::FeatureKey;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ImpactParams {
    pub enabled: bool,
}

/// Body of a toggle request. Without `confirmed: true` nothing is written.
#[derive(Debug, Deserialize)]
pub struct ToggleFeatureRequest {
    pub enabled: bool,
    #[serde(default)]
    pub confirmed: bool,
}

// ---------------------------------------------------------------------------
// GET /settings/features
// ---------------------------------------------------------------------------

/// Current global feature switches. Created with every feature on if the
/// settings row does not exist yet.
pub async fn get_features(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let settings = cascade::load_settings(&state.store()).await?;
    Ok(Json(DataResponse { data: settings }))
}

// ---------------------------------------------------------------------------
// GET /settings/features/{key}/impact
// ---------------------------------------------------------------------------

/// How many projects a toggle would touch. Never mutates.
pub async fn preview_toggle(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
    Query(params): Query<ImpactParams>,
) -> AppResult<impl IntoResponse> {
    let key: FeatureKey = key.parse()?;
    let impact = cascade::preview_toggle(&state.store(), key, params.enabled).await;
    Ok(Json(DataResponse { data: impact }))
}

// ---------------------------------------------------------------------------
// PUT /settings/features/{key}
// ---------------------------------------------------------------------------

/// Toggle a global feature and cascade it to projects.
///
/// Unconfirmed requests answer `428 Precondition Required` with the impact
/// the operator must confirm.
pub async fn toggle_feature(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
    Json(body): Json<ToggleFeatureRequest>,
) -> AppResult<impl IntoResponse> {
    let key: FeatureKey = key.parse()?;
    let outcome =
        cascade::toggle_feature(&state.store(), key, body.enabled, body.confirmed).await?;

    let status = match &outcome {
        ToggleOutcome::ConfirmationRequired { impact } => {
            tracing::debug!(
                feature = %key,
                enabled = body.enabled,
                affected = ?impact.affected_count,
                "Feature toggle awaiting confirmation"
            );
            StatusCode::PRECONDITION_REQUIRED
        }
        ToggleOutcome::Applied { report } => {
            tracing::info!(
                feature = %key,
                enabled = body.enabled,
                user_id = admin.user_id,
                succeeded = report.projects.succeeded,
                failed = report.projects.failed(),
                "Feature toggled"
            );
            StatusCode::OK
        }
    };

    Ok((status, Json(DataResponse { data: outcome })))
}
