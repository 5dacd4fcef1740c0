//! Well-known role and title constants, and the authorization predicates
//! built on them.
//!
//! Roles and titles come from identity-provider token claims. `role` is the
//! coarse permission level; `title` is the user's position in the portal.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

pub const TITLE_ADMIN: &str = "Admin";
pub const TITLE_PROJECT_MANAGER: &str = "Project Manager";
pub const TITLE_TEAM_MEMBER: &str = "Team Member";
pub const TITLE_CLIENT: &str = "Client";

/// Admins hold either the `admin` role or the `Admin` title.
pub fn is_admin(role: &str, title: Option<&str>) -> bool {
    role == ROLE_ADMIN || title == Some(TITLE_ADMIN)
}

/// Project managers may create projects; admins may do everything they can.
pub fn is_manager(role: &str, title: Option<&str>) -> bool {
    is_admin(role, title) || title == Some(TITLE_PROJECT_MANAGER)
}
