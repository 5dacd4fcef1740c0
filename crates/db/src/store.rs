//! Postgres-backed implementation of the core entity-store traits.

use async_trait::async_trait;
use portal_core::features::{FeatureKey, GlobalSettings};
use portal_core::store::{
    FeatureStore, NewTemplateItem, NewTimelineItem, ProjectFlags, SourceItem, StoreError,
    StoreResult, TimelineStore,
};
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::{
    GlobalSettingsRepo, ProjectRepo, TimelineItemRepo, TimelineTemplateItemRepo,
};

/// Adapts the repositories to the engines in `portal_core`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn found_or_missing(found: bool, entity: &'static str, id: DbId) -> StoreResult<()> {
    if found {
        Ok(())
    } else {
        Err(StoreError::Missing { entity, id })
    }
}

#[async_trait]
impl FeatureStore for PgStore {
    async fn load_settings(&self) -> StoreResult<Option<GlobalSettings>> {
        let row = GlobalSettingsRepo::find(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(|r| r.settings()))
    }

    async fn create_settings(&self, settings: &GlobalSettings) -> StoreResult<GlobalSettings> {
        let row = GlobalSettingsRepo::insert(&self.pool, settings)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.settings())
    }

    async fn write_global_flag(
        &self,
        key: FeatureKey,
        value: bool,
    ) -> StoreResult<GlobalSettings> {
        if let Some(row) = GlobalSettingsRepo::set_flag(&self.pool, key, value)
            .await
            .map_err(StoreError::backend)?
        {
            return Ok(row.settings());
        }
        // No row yet: create it with this flag already applied.
        tracing::info!(
            feature = %key,
            value,
            "Global settings missing; creating them with the flag applied"
        );
        let settings = GlobalSettings::default().with_flag(key, value);
        let row = GlobalSettingsRepo::insert(&self.pool, &settings)
            .await
            .map_err(StoreError::backend)?;
        if row.settings().flag(key) == value {
            return Ok(row.settings());
        }
        // A concurrent request created the row first; write over it.
        GlobalSettingsRepo::set_flag(&self.pool, key, value)
            .await
            .map_err(StoreError::backend)?
            .map(|row| row.settings())
            .ok_or(StoreError::Missing {
                entity: "GlobalSettings",
                id: 1,
            })
    }

    async fn list_project_flags(&self) -> StoreResult<Vec<ProjectFlags>> {
        let rows = ProjectRepo::list_feature_flags(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows
            .into_iter()
            .map(|row| ProjectFlags {
                project_id: row.id,
                features: row.features_enabled.0,
            })
            .collect())
    }

    async fn write_project_flag(
        &self,
        project_id: DbId,
        key: FeatureKey,
        value: bool,
    ) -> StoreResult<()> {
        let found = ProjectRepo::set_feature_flag(&self.pool, project_id, key, value)
            .await
            .map_err(StoreError::backend)?;
        found_or_missing(found, "Project", project_id)
    }
}

#[async_trait]
impl TimelineStore for PgStore {
    async fn list_template_items(&self, template_id: DbId) -> StoreResult<Vec<SourceItem>> {
        let items = TimelineTemplateItemRepo::list_by_template(&self.pool, template_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(items.into_iter().map(SourceItem::from).collect())
    }

    async fn create_template_item(
        &self,
        template_id: DbId,
        item: &NewTemplateItem,
    ) -> StoreResult<DbId> {
        let created = TimelineTemplateItemRepo::create(&self.pool, template_id, item)
            .await
            .map_err(StoreError::backend)?;
        Ok(created.id)
    }

    async fn set_template_item_parent(
        &self,
        id: DbId,
        parent_id: Option<DbId>,
    ) -> StoreResult<()> {
        let found = TimelineTemplateItemRepo::set_parent(&self.pool, id, parent_id)
            .await
            .map_err(StoreError::backend)?;
        found_or_missing(found, "TimelineTemplateItem", id)
    }

    async fn create_timeline_item(
        &self,
        project_id: DbId,
        item: &NewTimelineItem,
    ) -> StoreResult<DbId> {
        let created = TimelineItemRepo::create(&self.pool, project_id, item)
            .await
            .map_err(StoreError::backend)?;
        Ok(created.id)
    }

    async fn set_timeline_item_parent(
        &self,
        id: DbId,
        parent_id: Option<DbId>,
    ) -> StoreResult<()> {
        let found = TimelineItemRepo::set_parent(&self.pool, id, parent_id)
            .await
            .map_err(StoreError::backend)?;
        found_or_missing(found, "TimelineItem", id)
    }
}
