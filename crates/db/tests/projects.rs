//! Integration tests for the `projects` repository against a real database.
//!
//! Covers archiving as a lifecycle state, membership-filtered listing, the
//! partial update, and the single-key flag write used by the cascade.

use portal_core::features::{FeatureKey, ProjectFeatures};
use portal_core::project::{STATUS_ACTIVE, STATUS_ARCHIVED, STATUS_ON_HOLD};
use portal_db::models::project::{CreateProject, UpdateProject};
use portal_db::repositories::ProjectRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: Some("repository test".to_string()),
        client_name: None,
        status: None,
        start_date: None,
        project_manager_ids: Vec::new(),
        team_member_ids: vec![11],
        client_ids: vec![12],
        template_id: None,
    }
}

fn empty_update() -> UpdateProject {
    UpdateProject {
        name: None,
        description: None,
        client_name: None,
        status: None,
        start_date: None,
        project_manager_ids: None,
        team_member_ids: None,
        client_ids: None,
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_defaults_to_active(pool: PgPool) {
    let mut features = ProjectFeatures::default();
    features.set(FeatureKey::Chat, false);

    let project = ProjectRepo::create(&pool, &new_project("Rebrand"), &features, &[10])
        .await
        .unwrap();

    assert_eq!(project.status, STATUS_ACTIVE);
    assert_eq!(project.project_manager_ids, vec![10]);
    assert_eq!(project.features_enabled.flag(FeatureKey::Chat), Some(false));
    assert!(project.deleted_at.is_none());
}

// ---------------------------------------------------------------------------
// Archive / restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_archive_sets_status_and_hides_project(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Archive Me"), &Default::default(), &[10])
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());

    assert!(
        ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_none(),
        "archived project should not be found"
    );
    let live = ProjectRepo::list(&pool, false).await.unwrap();
    assert!(!live.iter().any(|p| p.id == project.id));

    let archived = ProjectRepo::list(&pool, true).await.unwrap();
    let row = archived
        .iter()
        .find(|p| p.id == project.id)
        .expect("archived project should be listed as archived");
    assert_eq!(row.status, STATUS_ARCHIVED);
    assert!(row.deleted_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_archive_is_idempotent(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Twice"), &Default::default(), &[10])
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(
        !ProjectRepo::soft_delete(&pool, project.id).await.unwrap(),
        "second archive should report nothing archived"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_returns_project_to_active(pool: PgPool) {
    let mut input = new_project("Paused Then Archived");
    input.status = Some(STATUS_ON_HOLD.to_string());
    let project = ProjectRepo::create(&pool, &input, &Default::default(), &[10])
        .await
        .unwrap();

    ProjectRepo::soft_delete(&pool, project.id).await.unwrap();
    assert!(ProjectRepo::restore(&pool, project.id).await.unwrap());

    let restored = ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .expect("restored project should be visible");
    assert_eq!(restored.status, STATUS_ACTIVE);
    assert!(restored.deleted_at.is_none());

    assert!(
        !ProjectRepo::restore(&pool, project.id).await.unwrap(),
        "restoring a live project should report nothing restored"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_removes_row(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Gone"), &Default::default(), &[10])
        .await
        .unwrap();

    assert!(ProjectRepo::hard_delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::list(&pool, false).await.unwrap().is_empty());
    assert!(ProjectRepo::list(&pool, true).await.unwrap().is_empty());
    assert!(!ProjectRepo::hard_delete(&pool, project.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Membership listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_matches_any_membership(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Shared"), &Default::default(), &[10])
        .await
        .unwrap();
    let mut other = new_project("Private");
    other.team_member_ids = Vec::new();
    other.client_ids = Vec::new();
    ProjectRepo::create(&pool, &other, &Default::default(), &[20])
        .await
        .unwrap();

    for user_id in [10, 11, 12] {
        let visible = ProjectRepo::list_for_user(&pool, user_id, false).await.unwrap();
        assert_eq!(
            visible.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![project.id],
            "user {user_id} should see only the shared project"
        );
    }
    assert!(ProjectRepo::list_for_user(&pool, 99, false)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_separates_archived(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Old"), &Default::default(), &[10])
        .await
        .unwrap();
    ProjectRepo::soft_delete(&pool, project.id).await.unwrap();

    assert!(ProjectRepo::list_for_user(&pool, 11, false)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        ProjectRepo::list_for_user(&pool, 11, true).await.unwrap().len(),
        1
    );
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_given_fields(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Before"), &Default::default(), &[10])
        .await
        .unwrap();

    let mut patch = empty_update();
    patch.name = Some("After".to_string());
    patch.client_ids = Some(vec![12, 13]);
    let updated = ProjectRepo::update(&pool, project.id, &patch)
        .await
        .unwrap()
        .expect("live project should update");

    assert_eq!(updated.name, "After");
    assert_eq!(updated.client_ids, vec![12, 13]);
    assert_eq!(updated.description, project.description);
    assert_eq!(updated.team_member_ids, project.team_member_ids);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_skips_archived_project(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Frozen"), &Default::default(), &[10])
        .await
        .unwrap();
    ProjectRepo::soft_delete(&pool, project.id).await.unwrap();

    let mut patch = empty_update();
    patch.name = Some("Thawed".to_string());
    assert!(ProjectRepo::update(&pool, project.id, &patch)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Feature flags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_feature_flag_touches_one_key(pool: PgPool) {
    let mut features = ProjectFeatures::default();
    features.set(FeatureKey::Files, false);
    let project = ProjectRepo::create(&pool, &new_project("Flags"), &features, &[10])
        .await
        .unwrap();

    assert!(ProjectRepo::set_feature_flag(&pool, project.id, FeatureKey::Chat, false)
        .await
        .unwrap());

    let rows = ProjectRepo::list_feature_flags(&pool).await.unwrap();
    let flags = &rows
        .iter()
        .find(|row| row.id == project.id)
        .expect("project flags should be listed")
        .features_enabled;
    assert_eq!(flags.flag(FeatureKey::Chat), Some(false));
    assert_eq!(flags.flag(FeatureKey::Files), Some(false));
    assert_eq!(flags.flag(FeatureKey::Timeline), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_feature_flag_reports_missing_project(pool: PgPool) {
    assert!(!ProjectRepo::set_feature_flag(&pool, 4242, FeatureKey::Chat, true)
        .await
        .unwrap());
}
