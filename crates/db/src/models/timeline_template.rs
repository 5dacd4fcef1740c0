//! Timeline template and template item models and DTOs.

use portal_core::store::SourceItem;
use portal_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::double_option;

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A row from the `timeline_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineTemplate {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimelineTemplate {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
}

/// DTO for updating a template. All fields are optional.
///
/// `is_default` is not patched here; see `TimelineTemplateRepo::set_default`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTimelineTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Template item
// ---------------------------------------------------------------------------

/// A row from the `timeline_template_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineTemplateItem {
    pub id: DbId,
    pub template_id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub default_offset_days: Option<i32>,
    pub parent_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TimelineTemplateItem> for SourceItem {
    fn from(item: TimelineTemplateItem) -> Self {
        SourceItem {
            id: item.id,
            parent_id: item.parent_id,
            title: item.title,
            description: item.description,
            order: item.order,
            default_offset_days: item.default_offset_days,
        }
    }
}

/// DTO for adding an item to a template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateItem {
    pub title: String,
    pub description: Option<String>,
    /// Appended after the last item if omitted.
    pub order: Option<i32>,
    pub default_offset_days: Option<i32>,
    pub parent_id: Option<DbId>,
}

/// DTO for updating a template item. All fields are optional; send
/// `"parent_id": null` to move the item to the root.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplateItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub default_offset_days: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<DbId>>,
}
