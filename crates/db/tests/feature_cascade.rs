//! End-to-end tests of the core engines running on `PgStore`.
//!
//! Exercises the lazy settings row, the disable/enable cascade across live
//! and archived projects, and template instantiation with its parent tree.

use std::collections::HashMap;

use portal_core::cascade;
use portal_core::features::{self, FeatureKey, GlobalSettings, ProjectFeatures};
use portal_core::instantiation;
use portal_core::store::{FeatureStore, NewTemplateItem};
use portal_core::types::{Date, DbId};
use portal_db::models::project::CreateProject;
use portal_db::models::timeline_template::CreateTimelineTemplate;
use portal_db::repositories::{
    GlobalSettingsRepo, ProjectRepo, TimelineItemRepo, TimelineTemplateItemRepo,
    TimelineTemplateRepo,
};
use portal_db::store::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_project(pool: &PgPool, name: &str, features: &ProjectFeatures) -> DbId {
    let input = CreateProject {
        name: name.to_string(),
        description: None,
        client_name: None,
        status: None,
        start_date: None,
        project_manager_ids: Vec::new(),
        team_member_ids: Vec::new(),
        client_ids: Vec::new(),
        template_id: None,
    };
    ProjectRepo::create(pool, &input, features, &[1])
        .await
        .unwrap()
        .id
}

async fn project_features(pool: &PgPool, id: DbId) -> ProjectFeatures {
    ProjectRepo::list_feature_flags(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|row| row.id == id)
        .expect("project should exist")
        .features_enabled
        .0
}

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_created_lazily_with_defaults(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    assert!(GlobalSettingsRepo::find(&pool).await.unwrap().is_none());

    let settings = cascade::load_settings(&store).await.unwrap();
    assert_eq!(settings, GlobalSettings::default());
    assert!(GlobalSettingsRepo::find(&pool).await.unwrap().is_some());

    // A second insert keeps the existing row.
    let off = GlobalSettings::default().with_flag(FeatureKey::Wiki, false);
    let row = GlobalSettingsRepo::insert(&pool, &off).await.unwrap();
    assert!(row.settings().wiki_enabled);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_global_write_creates_missing_row(pool: PgPool) {
    let store = PgStore::new(pool.clone());

    let settings = store
        .write_global_flag(FeatureKey::Obeya, false)
        .await
        .unwrap();
    assert!(!settings.obeya_enabled);
    assert!(settings.chat_enabled);

    let stored = GlobalSettingsRepo::find(&pool).await.unwrap().unwrap();
    assert!(!stored.obeya_enabled);
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_disable_is_idempotent_and_enable_is_unconditional(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let seeded = ProjectFeatures::seeded_from(&GlobalSettings::default());
    let live = create_project(&pool, "Live", &seeded).await;
    let archived = create_project(&pool, "Archived", &seeded).await;
    let untouched = create_project(&pool, "Unset", &ProjectFeatures::default()).await;
    ProjectRepo::soft_delete(&pool, archived).await.unwrap();

    let first = cascade::disable_feature(&store, FeatureKey::Chat).await.unwrap();
    assert_eq!(first.projects.attempted, 3);
    assert_eq!(first.projects.succeeded, 3);
    assert!(!first.settings.chat_enabled);
    for id in [live, archived, untouched] {
        assert_eq!(project_features(&pool, id).await.flag(FeatureKey::Chat), Some(false));
    }

    let second = cascade::disable_feature(&store, FeatureKey::Chat).await.unwrap();
    assert_eq!(second.projects.attempted, 0);

    let enabled = cascade::enable_feature(&store, FeatureKey::Chat).await.unwrap();
    assert_eq!(enabled.projects.succeeded, 3);
    assert!(enabled.settings.chat_enabled);
    for id in [live, archived, untouched] {
        assert_eq!(project_features(&pool, id).await.flag(FeatureKey::Chat), Some(true));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cascade_leaves_other_keys_alone(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let mut features = ProjectFeatures::default();
    features.set(FeatureKey::Files, false);
    let id = create_project(&pool, "Mixed", &features).await;

    cascade::disable_feature(&store, FeatureKey::Timeline).await.unwrap();

    let stored = project_features(&pool, id).await;
    assert_eq!(stored.flag(FeatureKey::Timeline), Some(false));
    assert_eq!(stored.flag(FeatureKey::Files), Some(false));
    assert_eq!(stored.flag(FeatureKey::Chat), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_global_only_toggle_touches_no_project(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let id = create_project(&pool, "Plain", &ProjectFeatures::default()).await;

    let impact = cascade::preview_toggle(&store, FeatureKey::Wiki, false).await;
    assert_eq!(impact.affected_count, Some(0));

    let report = cascade::disable_feature(&store, FeatureKey::Wiki).await.unwrap();
    assert_eq!(report.projects.attempted, 0);
    assert!(!report.settings.wiki_enabled);
    assert_eq!(project_features(&pool, id).await, ProjectFeatures::default());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_global_off_wins_over_project_on(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let id = create_project(&pool, "Stubborn", &ProjectFeatures::default()).await;
    cascade::disable_feature(&store, FeatureKey::Chat).await.unwrap();
    ProjectRepo::set_feature_flag(&pool, id, FeatureKey::Chat, true)
        .await
        .unwrap();

    let settings = cascade::load_settings(&store).await.unwrap();
    let stored = project_features(&pool, id).await;
    assert!(!features::effective_enabled(&settings, &stored, FeatureKey::Chat));
}

// ---------------------------------------------------------------------------
// Instantiation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_instantiation_preserves_tree_and_dates(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let template = TimelineTemplateRepo::create(
        &pool,
        &CreateTimelineTemplate {
            name: "Launch".to_string(),
            description: None,
            category: None,
            color: None,
        },
    )
    .await
    .unwrap();
    let item = |title: &str, order: i32, offset: Option<i32>, parent_id: Option<DbId>| {
        NewTemplateItem {
            title: title.to_string(),
            description: None,
            order,
            default_offset_days: offset,
            parent_id,
        }
    };
    let a = TimelineTemplateItemRepo::create(&pool, template.id, &item("A", 0, Some(0), None))
        .await
        .unwrap();
    let b = TimelineTemplateItemRepo::create(&pool, template.id, &item("B", 1, Some(10), Some(a.id)))
        .await
        .unwrap();
    TimelineTemplateItemRepo::create(&pool, template.id, &item("C", 2, None, Some(b.id)))
        .await
        .unwrap();
    let project_id = create_project(&pool, "Launch Site", &ProjectFeatures::default()).await;

    let report =
        instantiation::instantiate_template(&store, template.id, project_id, date(2024, 1, 1))
            .await
            .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.created.len(), 3);
    assert_eq!(report.reparented, 2);

    let items = TimelineItemRepo::list_by_project(&pool, project_id).await.unwrap();
    let by_title: HashMap<&str, _> = items.iter().map(|i| (i.title.as_str(), i)).collect();
    assert_eq!(by_title["A"].parent_id, None);
    assert_eq!(by_title["B"].parent_id, Some(by_title["A"].id));
    assert_eq!(by_title["C"].parent_id, Some(by_title["B"].id));
    assert_eq!(by_title["B"].due_date, date(2024, 1, 11));
    assert_eq!(by_title["C"].due_date, date(2024, 1, 1));
    assert!(items.iter().all(|i| !i.is_completed));

    // Copies are new rows; the template keeps its own items.
    assert!(items.iter().all(|i| i.id != a.id && i.id != b.id));
    assert_eq!(
        TimelineTemplateItemRepo::list_by_template(&pool, template.id)
            .await
            .unwrap()
            .len(),
        3
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_template_instantiates_nothing(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let template = TimelineTemplateRepo::create(
        &pool,
        &CreateTimelineTemplate {
            name: "Blank".to_string(),
            description: None,
            category: None,
            color: None,
        },
    )
    .await
    .unwrap();
    let project_id = create_project(&pool, "Quiet", &ProjectFeatures::default()).await;

    let report =
        instantiation::instantiate_template(&store, template.id, project_id, date(2024, 1, 1))
            .await
            .unwrap();
    assert!(report.created.is_empty());
    assert!(TimelineItemRepo::list_by_project(&pool, project_id)
        .await
        .unwrap()
        .is_empty());
}
