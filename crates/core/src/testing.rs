//! In-memory entity store used by the engine tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::features::{FeatureKey, GlobalSettings, ProjectFeatures};
use crate::store::{
    FeatureStore, NewTemplateItem, NewTimelineItem, ProjectFlags, SourceItem, StoreError,
    StoreResult, TimelineStore,
};
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTemplateItem {
    pub template_id: DbId,
    pub item: SourceItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTimelineItem {
    pub project_id: DbId,
    pub item: NewTimelineItem,
}

#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    pub settings: Mutex<Option<GlobalSettings>>,
    pub projects: Mutex<BTreeMap<DbId, ProjectFeatures>>,
    pub project_writes: Mutex<Vec<(DbId, FeatureKey, bool)>>,
    pub failing_projects: Mutex<HashSet<DbId>>,
    pub fail_listing: AtomicBool,
    pub fail_global_write: AtomicBool,
    pub template_items: Mutex<BTreeMap<DbId, StoredTemplateItem>>,
    pub timeline_items: Mutex<BTreeMap<DbId, StoredTimelineItem>>,
    pub failing_titles: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            ..Default::default()
        }
    }

    fn allocate_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn add_project(&self, id: DbId, features: ProjectFeatures) {
        self.projects.lock().unwrap().insert(id, features);
    }

    pub fn project(&self, id: DbId) -> ProjectFeatures {
        self.projects.lock().unwrap()[&id].clone()
    }

    pub fn fail_project(&self, id: DbId) {
        self.failing_projects.lock().unwrap().insert(id);
    }

    pub fn fail_title(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    pub fn project_write_count(&self) -> usize {
        self.project_writes.lock().unwrap().len()
    }

    pub fn clear_writes(&self) {
        self.project_writes.lock().unwrap().clear();
    }

    pub fn add_template_item(
        &self,
        template_id: DbId,
        id: DbId,
        title: &str,
        parent_id: Option<DbId>,
        order: i32,
        default_offset_days: Option<i32>,
    ) {
        self.template_items.lock().unwrap().insert(
            id,
            StoredTemplateItem {
                template_id,
                item: SourceItem {
                    id,
                    parent_id,
                    title: title.to_string(),
                    description: None,
                    order,
                    default_offset_days,
                },
            },
        );
    }

    pub fn timeline_for(&self, project_id: DbId) -> BTreeMap<DbId, NewTimelineItem> {
        self.timeline_items
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, stored)| stored.project_id == project_id)
            .map(|(id, stored)| (*id, stored.item.clone()))
            .collect()
    }

    pub fn template_items_for(&self, template_id: DbId) -> Vec<SourceItem> {
        let mut items: Vec<SourceItem> = self
            .template_items
            .lock()
            .unwrap()
            .values()
            .filter(|stored| stored.template_id == template_id)
            .map(|stored| stored.item.clone())
            .collect();
        items.sort_by_key(|item| (item.order, item.id));
        items
    }

    fn check_title(&self, title: &str) -> StoreResult<()> {
        if self.failing_titles.lock().unwrap().contains(title) {
            return Err(StoreError::backend(format!("insert of '{title}' rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl FeatureStore for MemoryStore {
    async fn load_settings(&self) -> StoreResult<Option<GlobalSettings>> {
        Ok(*self.settings.lock().unwrap())
    }

    async fn create_settings(&self, settings: &GlobalSettings) -> StoreResult<GlobalSettings> {
        *self.settings.lock().unwrap() = Some(*settings);
        Ok(*settings)
    }

    async fn write_global_flag(&self, key: FeatureKey, value: bool) -> StoreResult<GlobalSettings> {
        if self.fail_global_write.load(Ordering::SeqCst) {
            return Err(StoreError::backend("settings write rejected"));
        }
        let mut guard = self.settings.lock().unwrap();
        let settings = guard.get_or_insert_with(GlobalSettings::default);
        settings.set_flag(key, value);
        Ok(*settings)
    }

    async fn list_project_flags(&self) -> StoreResult<Vec<ProjectFlags>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::backend("project listing unavailable"));
        }
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .map(|(id, features)| ProjectFlags {
                project_id: *id,
                features: features.clone(),
            })
            .collect())
    }

    async fn write_project_flag(
        &self,
        project_id: DbId,
        key: FeatureKey,
        value: bool,
    ) -> StoreResult<()> {
        if self.failing_projects.lock().unwrap().contains(&project_id) {
            return Err(StoreError::backend(format!(
                "write to project {project_id} timed out"
            )));
        }
        let mut projects = self.projects.lock().unwrap();
        let features = projects.get_mut(&project_id).ok_or(StoreError::Missing {
            entity: "Project",
            id: project_id,
        })?;
        features.set(key, value);
        self.project_writes
            .lock()
            .unwrap()
            .push((project_id, key, value));
        Ok(())
    }
}

#[async_trait]
impl TimelineStore for MemoryStore {
    async fn list_template_items(&self, template_id: DbId) -> StoreResult<Vec<SourceItem>> {
        Ok(self.template_items_for(template_id))
    }

    async fn create_template_item(
        &self,
        template_id: DbId,
        item: &NewTemplateItem,
    ) -> StoreResult<DbId> {
        self.check_title(&item.title)?;
        let id = self.allocate_id();
        self.template_items.lock().unwrap().insert(
            id,
            StoredTemplateItem {
                template_id,
                item: SourceItem {
                    id,
                    parent_id: item.parent_id,
                    title: item.title.clone(),
                    description: item.description.clone(),
                    order: item.order,
                    default_offset_days: item.default_offset_days,
                },
            },
        );
        Ok(id)
    }

    async fn set_template_item_parent(&self, id: DbId, parent_id: Option<DbId>) -> StoreResult<()> {
        let mut items = self.template_items.lock().unwrap();
        let stored = items.get_mut(&id).ok_or(StoreError::Missing {
            entity: "TimelineTemplateItem",
            id,
        })?;
        stored.item.parent_id = parent_id;
        Ok(())
    }

    async fn create_timeline_item(
        &self,
        project_id: DbId,
        item: &NewTimelineItem,
    ) -> StoreResult<DbId> {
        self.check_title(&item.title)?;
        let id = self.allocate_id();
        self.timeline_items.lock().unwrap().insert(
            id,
            StoredTimelineItem {
                project_id,
                item: item.clone(),
            },
        );
        Ok(id)
    }

    async fn set_timeline_item_parent(&self, id: DbId, parent_id: Option<DbId>) -> StoreResult<()> {
        let mut items = self.timeline_items.lock().unwrap();
        let stored = items.get_mut(&id).ok_or(StoreError::Missing {
            entity: "TimelineItem",
            id,
        })?;
        stored.item.parent_id = parent_id;
        Ok(())
    }
}
