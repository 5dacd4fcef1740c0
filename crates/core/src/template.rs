//! Timeline template validation and naming helpers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum length of a template name.
pub const MAX_TEMPLATE_NAME_LENGTH: usize = 200;

/// Maximum length of a template category.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Suffix appended to the name of a duplicated template.
pub const COPY_SUFFIX: &str = " (Copy)";

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"));

pub fn validate_template_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Template name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TEMPLATE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Template name exceeds maximum length of {MAX_TEMPLATE_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if category.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Category exceeds maximum length of {MAX_CATEGORY_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Colors are stored as `#rrggbb`.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    if !COLOR_RE.is_match(color) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Expected a hex value like #3b82f6"
        )));
    }
    Ok(())
}

/// Name for a duplicate of `name`, truncated so it stays valid.
pub fn copy_name(name: &str) -> String {
    let limit = MAX_TEMPLATE_NAME_LENGTH - COPY_SUFFIX.chars().count();
    let base: String = name.trim().chars().take(limit).collect();
    format!("{base}{COPY_SUFFIX}")
}
