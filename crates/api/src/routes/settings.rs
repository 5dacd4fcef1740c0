//! Route definitions for global feature settings.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET    /features                  -> get_features
/// PUT    /features/{key}            -> toggle_feature
/// GET    /features/{key}/impact     -> preview_toggle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/features", get(settings::get_features))
        .route("/features/{key}", put(settings::toggle_feature))
        .route("/features/{key}/impact", get(settings::preview_toggle))
}
