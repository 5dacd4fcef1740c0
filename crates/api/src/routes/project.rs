//! Route definitions for the `/projects` resource.
//!
//! Also nests the project timeline under `/projects/{id}/timeline`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{project, timeline};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                      -> list
/// POST   /                                      -> create
/// GET    /{id}                                  -> get_by_id
/// PUT    /{id}                                  -> update
/// DELETE /{id}                                  -> archive
/// POST   /{id}/restore                          -> restore
/// DELETE /{id}/permanent                        -> hard_delete
/// GET    /{id}/features                         -> get_features
/// PUT    /{id}/features/{key}                   -> set_feature
///
/// GET    /{id}/timeline                         -> list
/// POST   /{id}/timeline                         -> create
/// PUT    /{id}/timeline/{item_id}               -> update
/// DELETE /{id}/timeline/{item_id}               -> delete
/// POST   /{id}/timeline/{item_id}/toggle        -> toggle_completed
/// GET    /{id}/timeline/{item_id}/parent-candidates -> parent_candidates
/// ```
pub fn router() -> Router<AppState> {
    let timeline_routes = Router::new()
        .route("/", get(timeline::list).post(timeline::create))
        .route(
            "/{item_id}",
            put(timeline::update).delete(timeline::delete),
        )
        .route("/{item_id}/toggle", post(timeline::toggle_completed))
        .route(
            "/{item_id}/parent-candidates",
            get(timeline::parent_candidates),
        );

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::archive),
        )
        .route("/{id}/restore", post(project::restore))
        .route("/{id}/permanent", delete(project::hard_delete))
        .route("/{id}/features", get(project::get_features))
        .route("/{id}/features/{key}", put(project::set_feature))
        .nest("/{id}/timeline", timeline_routes)
}
