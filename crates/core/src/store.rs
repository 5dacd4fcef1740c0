//! Entity-store seams consumed by the cascade and instantiation engines.
//!
//! The engines only need a narrow slice of the backing store: the settings
//! singleton, each project's flag map, and create/re-parent operations on
//! template and timeline items. Implementations live outside this crate.

use async_trait::async_trait;

use crate::features::{FeatureKey, GlobalSettings, ProjectFeatures};
use crate::types::{Date, DbId};

/// Failure reported by an entity store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id {id} does not exist")]
    Missing { entity: &'static str, id: DbId },

    #[error("Entity store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Feature flags
// ---------------------------------------------------------------------------

/// A project's flag map as seen by the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFlags {
    pub project_id: DbId,
    pub features: ProjectFeatures,
}

#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// The settings singleton, or `None` before first access.
    async fn load_settings(&self) -> StoreResult<Option<GlobalSettings>>;

    async fn create_settings(&self, settings: &GlobalSettings) -> StoreResult<GlobalSettings>;

    /// Persist one global flag and return the full record.
    async fn write_global_flag(&self, key: FeatureKey, value: bool)
        -> StoreResult<GlobalSettings>;

    /// Every project, archived ones included.
    async fn list_project_flags(&self) -> StoreResult<Vec<ProjectFlags>>;

    async fn write_project_flag(
        &self,
        project_id: DbId,
        key: FeatureKey,
        value: bool,
    ) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Timeline templates
// ---------------------------------------------------------------------------

/// A template item as read for cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub default_offset_days: Option<i32>,
}

/// Fields of a timeline item to insert. New items are never completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimelineItem {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Date,
    pub order: i32,
    pub parent_id: Option<DbId>,
}

/// Fields of a template item to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplateItem {
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub default_offset_days: Option<i32>,
    pub parent_id: Option<DbId>,
}

#[async_trait]
pub trait TimelineStore: Send + Sync {
    /// Items of one template, ordered by `order`.
    async fn list_template_items(&self, template_id: DbId) -> StoreResult<Vec<SourceItem>>;

    async fn create_template_item(
        &self,
        template_id: DbId,
        item: &NewTemplateItem,
    ) -> StoreResult<DbId>;

    async fn set_template_item_parent(&self, id: DbId, parent_id: Option<DbId>)
        -> StoreResult<()>;

    async fn create_timeline_item(
        &self,
        project_id: DbId,
        item: &NewTimelineItem,
    ) -> StoreResult<DbId>;

    async fn set_timeline_item_parent(&self, id: DbId, parent_id: Option<DbId>)
        -> StoreResult<()>;
}
