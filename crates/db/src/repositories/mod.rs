//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod global_settings_repo;
pub mod project_repo;
pub mod timeline_item_repo;
pub mod timeline_template_item_repo;
pub mod timeline_template_repo;

pub use global_settings_repo::GlobalSettingsRepo;
pub use project_repo::ProjectRepo;
pub use timeline_item_repo::TimelineItemRepo;
pub use timeline_template_item_repo::TimelineTemplateItemRepo;
pub use timeline_template_repo::TimelineTemplateRepo;
