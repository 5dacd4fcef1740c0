//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the admin role or title.
//! - [`rbac::RequireManager`] -- Requires an admin or a Project Manager.

pub mod auth;
pub mod rbac;
