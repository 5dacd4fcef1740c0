//! Request handlers.
//!
//! Handlers validate input with `portal_core`, delegate persistence to the
//! repositories in `portal_db`, and map errors via [`AppError`](crate::error::AppError).

pub mod project;
pub mod settings;
pub mod template;
pub mod timeline;
