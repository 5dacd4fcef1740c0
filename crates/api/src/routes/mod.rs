pub mod health;
pub mod project;
pub mod settings;
pub mod template;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /settings/features                               global switches (GET)
/// /settings/features/{key}                         toggle + cascade (PUT, admin)
/// /settings/features/{key}/impact                  toggle preview (GET, admin)
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, archive
/// /projects/{id}/restore                           restore (POST, admin)
/// /projects/{id}/permanent                         hard delete (DELETE, admin)
/// /projects/{id}/features                          effective feature map (GET)
/// /projects/{id}/features/{key}                    per-project switch (PUT)
/// /projects/{id}/timeline                          list, create
/// /projects/{id}/timeline/{item_id}                update, delete
/// /projects/{id}/timeline/{item_id}/toggle         toggle completion (POST)
/// /projects/{id}/timeline/{item_id}/parent-candidates
///
/// /templates                                       list, create
/// /templates/{id}                                  get, update, delete
/// /templates/{id}/default                          set default (POST)
/// /templates/{id}/duplicate                        duplicate (POST)
/// /templates/{id}/items                            list, create
/// /templates/{id}/items/{item_id}                  update, delete
/// /templates/{id}/items/{item_id}/parent-candidates
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/settings", settings::router())
        .nest("/projects", project::router())
        .nest("/templates", template::router())
}
