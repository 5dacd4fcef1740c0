//! Feature toggle cascade: propagates a global switch to every project.
//!
//! Disabling a feature turns it off only on projects where it is currently
//! on, so repeating a disable touches nothing. Enabling rewrites the flag on
//! every project unconditionally, including ones already enabled.
//!
//! The global flag is written before the project batch. The two are not
//! atomic: if project writes fail, the global flag stays as written and the
//! failures are returned in the report.

use futures::future::join_all;
use serde::Serialize;

use crate::batch::BatchSummary;
use crate::error::CoreError;
use crate::features::{FeatureKey, GlobalSettings};
use crate::store::{FeatureStore, ProjectFlags};
use crate::types::DbId;

/// What a toggle would do, computed before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleImpact {
    pub feature: FeatureKey,
    pub enabled: bool,
    /// `None` when the projects could not be counted.
    pub affected_count: Option<usize>,
}

/// Result of an applied toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub feature: FeatureKey,
    pub enabled: bool,
    pub settings: GlobalSettings,
    pub projects: BatchSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The operator has not confirmed yet; nothing was written.
    ConfirmationRequired { impact: ToggleImpact },
    Applied { report: CascadeReport },
}

/// Return the settings singleton, creating it with every feature on.
pub async fn load_settings<S>(store: &S) -> Result<GlobalSettings, CoreError>
where
    S: FeatureStore + ?Sized,
{
    if let Some(settings) = store.load_settings().await? {
        return Ok(settings);
    }
    let settings = store.create_settings(&GlobalSettings::default()).await?;
    tracing::info!("Global settings created with defaults");
    Ok(settings)
}

/// Projects whose flag a toggle to `enabled` would write.
///
/// Global-only features have no project flag, so they affect no projects.
pub fn affected_projects(projects: &[ProjectFlags], key: FeatureKey, enabled: bool) -> Vec<DbId> {
    if !key.is_project_scoped() {
        return Vec::new();
    }
    projects
        .iter()
        .filter(|p| enabled || p.features.is_enabled(key))
        .map(|p| p.project_id)
        .collect()
}

/// Count the projects a toggle would touch.
///
/// A failed count degrades to an unknown impact rather than an error, so the
/// confirmation step can still be shown.
pub async fn preview_toggle<S>(store: &S, key: FeatureKey, enabled: bool) -> ToggleImpact
where
    S: FeatureStore + ?Sized,
{
    let affected_count = match store.list_project_flags().await {
        Ok(projects) => Some(affected_projects(&projects, key, enabled).len()),
        Err(err) => {
            tracing::warn!(
                feature = %key,
                enabled,
                error = %err,
                "Could not count projects affected by feature toggle"
            );
            None
        }
    };
    ToggleImpact {
        feature: key,
        enabled,
        affected_count,
    }
}

/// Toggle a global feature, cascading to projects once the operator has
/// confirmed. Without confirmation only the impact is returned.
pub async fn toggle_feature<S>(
    store: &S,
    key: FeatureKey,
    enabled: bool,
    confirmed: bool,
) -> Result<ToggleOutcome, CoreError>
where
    S: FeatureStore + ?Sized,
{
    if !confirmed {
        let impact = preview_toggle(store, key, enabled).await;
        return Ok(ToggleOutcome::ConfirmationRequired { impact });
    }
    let report = if enabled {
        enable_feature(store, key).await?
    } else {
        disable_feature(store, key).await?
    };
    Ok(ToggleOutcome::Applied { report })
}

/// Turn a feature off globally and on every project that has it on.
pub async fn disable_feature<S>(store: &S, key: FeatureKey) -> Result<CascadeReport, CoreError>
where
    S: FeatureStore + ?Sized,
{
    apply(store, key, false).await
}

/// Turn a feature on globally and on every project.
pub async fn enable_feature<S>(store: &S, key: FeatureKey) -> Result<CascadeReport, CoreError>
where
    S: FeatureStore + ?Sized,
{
    apply(store, key, true).await
}

async fn apply<S>(store: &S, key: FeatureKey, enabled: bool) -> Result<CascadeReport, CoreError>
where
    S: FeatureStore + ?Sized,
{
    // Enumerate before the global write so the affected set reflects the
    // state the operator confirmed.
    let projects = store.list_project_flags().await?;
    let affected = affected_projects(&projects, key, enabled);

    let settings = store.write_global_flag(key, enabled).await?;
    tracing::info!(
        feature = %key,
        enabled,
        affected = affected.len(),
        "Global feature flag written"
    );

    let writes = affected.iter().map(|&project_id| async move {
        let result = store.write_project_flag(project_id, key, enabled).await;
        (project_id, result)
    });
    let results = join_all(writes).await;

    for (project_id, result) in &results {
        if let Err(err) = result {
            tracing::error!(
                project_id,
                feature = %key,
                enabled,
                error = %err,
                "Project feature flag write failed"
            );
        }
    }

    let summary = BatchSummary::from_results(results);
    tracing::info!(
        feature = %key,
        enabled,
        succeeded = summary.succeeded,
        failed = summary.failed(),
        "Feature cascade finished"
    );

    Ok(CascadeReport {
        feature: key,
        enabled,
        settings,
        projects: summary,
    })
}
