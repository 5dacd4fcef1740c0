//! Two-phase cloning of template item trees.
//!
//! Pass 1 creates every copy without a parent and records which new id each
//! source item became. Pass 2 starts only after pass 1 has fully finished
//! and points each copy at the copy of its source's parent. Both passes run
//! their writes concurrently.
//!
//! The same engine instantiates a template into a project timeline (dated
//! items) and duplicates a template into a new template.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

use crate::batch::ItemFailure;
use crate::error::CoreError;
use crate::store::{NewTemplateItem, NewTimelineItem, SourceItem, StoreResult, TimelineStore};
use crate::timeline::due_date;
use crate::types::{Date, DbId};

/// Where cloned items are written.
#[async_trait]
pub trait CloneTarget: Send + Sync {
    /// Create a parentless copy of `item` and return its id.
    async fn create_copy(&self, item: &SourceItem) -> StoreResult<DbId>;

    async fn set_parent(&self, id: DbId, parent_id: DbId) -> StoreResult<()>;
}

/// Clone into a project's timeline, dating items from `start_date`.
pub struct ProjectTimeline<'a, S: ?Sized> {
    pub store: &'a S,
    pub project_id: DbId,
    pub start_date: Date,
}

#[async_trait]
impl<'a, S> CloneTarget for ProjectTimeline<'a, S>
where
    S: TimelineStore + ?Sized,
{
    async fn create_copy(&self, item: &SourceItem) -> StoreResult<DbId> {
        let new_item = NewTimelineItem {
            title: item.title.clone(),
            description: item.description.clone(),
            due_date: due_date(self.start_date, item.default_offset_days),
            order: item.order,
            parent_id: None,
        };
        self.store
            .create_timeline_item(self.project_id, &new_item)
            .await
    }

    async fn set_parent(&self, id: DbId, parent_id: DbId) -> StoreResult<()> {
        self.store.set_timeline_item_parent(id, Some(parent_id)).await
    }
}

/// Clone into another template.
pub struct TemplateCopy<'a, S: ?Sized> {
    pub store: &'a S,
    pub template_id: DbId,
}

#[async_trait]
impl<'a, S> CloneTarget for TemplateCopy<'a, S>
where
    S: TimelineStore + ?Sized,
{
    async fn create_copy(&self, item: &SourceItem) -> StoreResult<DbId> {
        let new_item = NewTemplateItem {
            title: item.title.clone(),
            description: item.description.clone(),
            order: item.order,
            default_offset_days: item.default_offset_days,
            parent_id: None,
        };
        self.store
            .create_template_item(self.template_id, &new_item)
            .await
    }

    async fn set_parent(&self, id: DbId, parent_id: DbId) -> StoreResult<()> {
        self.store.set_template_item_parent(id, Some(parent_id)).await
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of a clone. Ids in failure lists are source item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CloneReport {
    /// Source item id -> id of its copy.
    pub created: BTreeMap<DbId, DbId>,
    pub reparented: usize,
    /// Source items whose parent had no copy; their copies stay at the root.
    pub dangling_parents: Vec<DbId>,
    pub create_failures: Vec<ItemFailure>,
    pub reparent_failures: Vec<ItemFailure>,
}

impl CloneReport {
    pub fn is_complete(&self) -> bool {
        self.dangling_parents.is_empty()
            && self.create_failures.is_empty()
            && self.reparent_failures.is_empty()
    }
}

/// Parent writes for pass 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReparentPlan {
    /// `(source_id, new_id, new_parent_id)`.
    pub updates: Vec<(DbId, DbId, DbId)>,
    pub dangling: Vec<DbId>,
}

/// Map each copied item's source parent onto the parent's copy.
///
/// Items whose own copy failed are skipped; items whose parent has no copy
/// are reported as dangling.
pub fn plan_reparenting(items: &[SourceItem], created: &BTreeMap<DbId, DbId>) -> ReparentPlan {
    let mut plan = ReparentPlan::default();
    for item in items {
        let (Some(parent_id), Some(&new_id)) = (item.parent_id, created.get(&item.id)) else {
            continue;
        };
        match created.get(&parent_id) {
            Some(&new_parent_id) => plan.updates.push((item.id, new_id, new_parent_id)),
            None => plan.dangling.push(item.id),
        }
    }
    plan
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Clone `items` into `target` in two passes.
pub async fn clone_items<T>(items: &[SourceItem], target: &T) -> CloneReport
where
    T: CloneTarget + ?Sized,
{
    let mut report = CloneReport::default();

    // Pass 1: flat creation.
    let creates = items.iter().map(|item| async move {
        let result = target.create_copy(item).await;
        (item.id, result)
    });
    for (source_id, result) in join_all(creates).await {
        match result {
            Ok(new_id) => {
                report.created.insert(source_id, new_id);
            }
            Err(err) => {
                tracing::error!(source_id, error = %err, "Failed to copy template item");
                report.create_failures.push(ItemFailure {
                    id: source_id,
                    error: err.to_string(),
                });
            }
        }
    }

    // Pass 2: re-parenting against the completed mapping.
    let plan = plan_reparenting(items, &report.created);
    for source_id in &plan.dangling {
        tracing::warn!(
            source_id,
            "Template item parent has no copy; leaving item without a parent"
        );
    }
    report.dangling_parents = plan.dangling;

    let updates = plan
        .updates
        .iter()
        .map(|&(source_id, new_id, new_parent_id)| async move {
            let result = target.set_parent(new_id, new_parent_id).await;
            (source_id, result)
        });
    for (source_id, result) in join_all(updates).await {
        match result {
            Ok(()) => report.reparented += 1,
            Err(err) => {
                tracing::error!(source_id, error = %err, "Failed to re-parent copied item");
                report.reparent_failures.push(ItemFailure {
                    id: source_id,
                    error: err.to_string(),
                });
            }
        }
    }

    report
}

async fn load_items<S>(store: &S, template_id: DbId) -> Result<Vec<SourceItem>, CoreError>
where
    S: TimelineStore + ?Sized,
{
    let mut items = store.list_template_items(template_id).await?;
    items.sort_by_key(|item| (item.order, item.id));
    Ok(items)
}

/// Create dated timeline items for `project_id` from a template.
///
/// A template without items creates nothing and is not an error.
pub async fn instantiate_template<S>(
    store: &S,
    template_id: DbId,
    project_id: DbId,
    start_date: Date,
) -> Result<CloneReport, CoreError>
where
    S: TimelineStore + ?Sized,
{
    let items = load_items(store, template_id).await?;
    if items.is_empty() {
        tracing::info!(template_id, project_id, "Template has no items; nothing to instantiate");
        return Ok(CloneReport::default());
    }

    let target = ProjectTimeline {
        store,
        project_id,
        start_date,
    };
    let report = clone_items(&items, &target).await;
    tracing::info!(
        template_id,
        project_id,
        %start_date,
        created = report.created.len(),
        reparented = report.reparented,
        complete = report.is_complete(),
        "Template instantiated into project timeline"
    );
    Ok(report)
}

/// Copy every item of `source_template_id` into `new_template_id`.
pub async fn duplicate_template_items<S>(
    store: &S,
    source_template_id: DbId,
    new_template_id: DbId,
) -> Result<CloneReport, CoreError>
where
    S: TimelineStore + ?Sized,
{
    let items = load_items(store, source_template_id).await?;
    let target = TemplateCopy {
        store,
        template_id: new_template_id,
    };
    let report = clone_items(&items, &target).await;
    tracing::info!(
        source_template_id,
        new_template_id,
        created = report.created.len(),
        complete = report.is_complete(),
        "Template items duplicated"
    );
    Ok(report)
}
