//! Route definitions for timeline templates.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::template;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                                         -> list
/// POST   /                                         -> create
/// GET    /{id}                                     -> get_by_id
/// PUT    /{id}                                     -> update
/// DELETE /{id}                                     -> delete
/// POST   /{id}/default                             -> set_default
/// POST   /{id}/duplicate                           -> duplicate
/// GET    /{id}/items                               -> list_items
/// POST   /{id}/items                               -> create_item
/// PUT    /{id}/items/{item_id}                     -> update_item
/// DELETE /{id}/items/{item_id}                     -> delete_item
/// GET    /{id}/items/{item_id}/parent-candidates   -> parent_candidates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(template::list).post(template::create))
        .route(
            "/{id}",
            get(template::get_by_id)
                .put(template::update)
                .delete(template::delete),
        )
        .route("/{id}/default", post(template::set_default))
        .route("/{id}/duplicate", post(template::duplicate))
        .route(
            "/{id}/items",
            get(template::list_items).post(template::create_item),
        )
        .route(
            "/{id}/items/{item_id}",
            put(template::update_item).delete(template::delete_item),
        )
        .route(
            "/{id}/items/{item_id}/parent-candidates",
            get(template::parent_candidates),
        )
}
