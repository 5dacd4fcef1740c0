//! Project timeline item model and DTOs.

use portal_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::double_option;

/// A row from the `timeline_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineItem {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Date,
    pub is_completed: bool,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub parent_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding an ad-hoc item to a project timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimelineItem {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Date,
    /// Appended after the last item if omitted.
    pub order: Option<i32>,
    pub parent_id: Option<DbId>,
}

/// DTO for editing a timeline item. All fields are optional; send
/// `"parent_id": null` to move the item to the root.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTimelineItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Date>,
    pub is_completed: Option<bool>,
    pub order: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<DbId>>,
}
