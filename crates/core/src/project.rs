//! Project lifecycle constants, validation, and membership-based visibility.

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_ON_HOLD: &str = "on_hold";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ARCHIVED: &str = "archived";

/// All valid project lifecycle states.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_ACTIVE,
    STATUS_ON_HOLD,
    STATUS_COMPLETED,
    STATUS_ARCHIVED,
];

/// Maximum length of a project name.
pub const MAX_PROJECT_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project name exceeds maximum length of {MAX_PROJECT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if !VALID_STATUSES.contains(&status) {
        return Err(CoreError::Validation(format!(
            "Invalid project status '{}'. Valid statuses: {}",
            status,
            VALID_STATUSES.join(", ")
        )));
    }
    Ok(())
}

/// Status a client may set directly on create or update.
///
/// `archived` is only reached through archiving, which also hides the
/// project from listings.
pub fn validate_assignable_status(status: &str) -> Result<(), CoreError> {
    validate_status(status)?;
    if status == STATUS_ARCHIVED {
        return Err(CoreError::Validation(
            "Projects are archived through the archive endpoint, not by setting the status"
                .to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// Sort and deduplicate a list of user ids so it behaves as a set.
pub fn normalize_member_ids(mut ids: Vec<DbId>) -> Vec<DbId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Manager ids for a new project, always including its creator.
pub fn managers_with_creator(mut ids: Vec<DbId>, creator_id: DbId) -> Vec<DbId> {
    ids.push(creator_id);
    normalize_member_ids(ids)
}

/// Who is attached to a project, borrowed from the project row.
#[derive(Debug, Clone, Copy)]
pub struct Membership<'a> {
    pub project_manager_ids: &'a [DbId],
    pub team_member_ids: &'a [DbId],
    pub client_ids: &'a [DbId],
}

impl Membership<'_> {
    /// Admins see everything; everyone else needs to be attached.
    pub fn can_view(&self, user_id: DbId, is_admin: bool) -> bool {
        is_admin
            || self.project_manager_ids.contains(&user_id)
            || self.team_member_ids.contains(&user_id)
            || self.client_ids.contains(&user_id)
    }

    /// Managers and team members work on the timeline; clients only read it.
    pub fn can_contribute(&self, user_id: DbId, is_admin: bool) -> bool {
        self.can_manage(user_id, is_admin) || self.team_member_ids.contains(&user_id)
    }

    /// Only the project's managers (and admins) may change it.
    pub fn can_manage(&self, user_id: DbId, is_admin: bool) -> bool {
        is_admin || self.project_manager_ids.contains(&user_id)
    }
}
