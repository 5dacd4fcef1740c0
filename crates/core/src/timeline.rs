//! Timeline dates and parent/child tree rules.
//!
//! Template items and timeline items both form forests through `parent_id`.
//! The helpers here work on `(id, parent_id)` pairs so either kind can be
//! checked without loading full rows.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest offset (in either direction) a template item may carry.
pub const MAX_OFFSET_DAYS: i32 = 3650;

/// Maximum length of a timeline or template item title.
pub const MAX_ITEM_TITLE_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// The date instantiation counts offsets from: the project's start date,
/// or `today` when the project has none.
pub fn resolve_start_date(start_date: Option<Date>, today: Date) -> Date {
    start_date.unwrap_or(today)
}

/// `start + offset` days. A missing offset means the start date itself.
///
/// Results outside chrono's calendar range clamp to its bounds.
pub fn due_date(start: Date, offset_days: Option<i32>) -> Date {
    let offset = i64::from(offset_days.unwrap_or(0));
    start
        .checked_add_signed(chrono::Duration::days(offset))
        .unwrap_or(if offset < 0 { Date::MIN } else { Date::MAX })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_item_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_ITEM_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_ITEM_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_offset_days(offset: i32) -> Result<(), CoreError> {
    if !(-MAX_OFFSET_DAYS..=MAX_OFFSET_DAYS).contains(&offset) {
        return Err(CoreError::Validation(format!(
            "default_offset_days must be within +/-{MAX_OFFSET_DAYS}, got {offset}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parent tree
// ---------------------------------------------------------------------------

/// Whether `candidate` sits somewhere below `ancestor` in the tree.
///
/// Walks `candidate`'s parent chain upward. A chain that loops back on
/// itself (bad data) stops the walk.
pub fn is_descendant(parents: &HashMap<DbId, Option<DbId>>, candidate: DbId, ancestor: DbId) -> bool {
    let mut seen = HashSet::new();
    let mut current = parents.get(&candidate).copied().flatten();
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }
    false
}

/// Items that may become the parent of `editing`: everything except the
/// item itself and its descendants. Input order is preserved.
pub fn eligible_parents<I>(items: I, editing: DbId) -> Vec<DbId>
where
    I: IntoIterator<Item = (DbId, Option<DbId>)>,
{
    let links: Vec<(DbId, Option<DbId>)> = items.into_iter().collect();
    let parents: HashMap<DbId, Option<DbId>> = links.iter().copied().collect();
    links
        .into_iter()
        .map(|(id, _)| id)
        .filter(|&id| id != editing && !is_descendant(&parents, id, editing))
        .collect()
}

/// Reject a parent assignment that would break the tree.
///
/// `items` are the siblings-in-scope (same template or same project) and
/// must include `item_id`. `None` always succeeds.
pub fn validate_parent_assignment<I>(
    items: I,
    item_id: DbId,
    parent_id: Option<DbId>,
) -> Result<(), CoreError>
where
    I: IntoIterator<Item = (DbId, Option<DbId>)>,
{
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if parent_id == item_id {
        return Err(CoreError::Validation(
            "An item cannot be its own parent".into(),
        ));
    }
    let parents: HashMap<DbId, Option<DbId>> = items.into_iter().collect();
    if !parents.contains_key(&parent_id) {
        return Err(CoreError::Validation(format!(
            "Parent item {parent_id} does not belong to the same list"
        )));
    }
    if is_descendant(&parents, parent_id, item_id) {
        return Err(CoreError::Validation(format!(
            "Item {parent_id} is a descendant of item {item_id}; assigning it as parent would create a cycle"
        )));
    }
    Ok(())
}

/// Reject a parent for a not-yet-created item unless it is in scope.
pub fn validate_new_parent<I>(items: I, parent_id: Option<DbId>) -> Result<(), CoreError>
where
    I: IntoIterator<Item = DbId>,
{
    match parent_id {
        Some(parent_id) if !items.into_iter().any(|id| id == parent_id) => {
            Err(CoreError::Validation(format!(
                "Parent item {parent_id} does not belong to the same list"
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const A: DbId = 1;
    const B: DbId = 2;
    const C: DbId = 3;

    fn chain() -> Vec<(DbId, Option<DbId>)> {
        vec![(A, None), (B, Some(A)), (C, Some(B))]
    }

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    // -- dates ---------------------------------------------------------------

    #[test]
    fn offset_adds_days_to_start() {
        assert_eq!(due_date(date(2024, 1, 1), Some(10)), date(2024, 1, 11));
    }

    #[test]
    fn missing_offset_is_start_date() {
        assert_eq!(due_date(date(2024, 3, 5), None), date(2024, 3, 5));
    }

    #[test]
    fn negative_offset_goes_backwards() {
        assert_eq!(due_date(date(2024, 3, 1), Some(-1)), date(2024, 2, 29));
    }

    #[test]
    fn start_date_falls_back_to_today() {
        let today = date(2025, 6, 1);
        assert_eq!(resolve_start_date(None, today), today);
        assert_eq!(resolve_start_date(Some(date(2024, 1, 1)), today), date(2024, 1, 1));
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn blank_title_rejects() {
        assert!(validate_item_title("   ").is_err());
        assert!(validate_item_title("Kickoff").is_ok());
    }

    #[test]
    fn offset_bounds() {
        assert!(validate_offset_days(MAX_OFFSET_DAYS).is_ok());
        assert!(validate_offset_days(-MAX_OFFSET_DAYS).is_ok());
        assert!(validate_offset_days(MAX_OFFSET_DAYS + 1).is_err());
        assert!(validate_offset_days(-MAX_OFFSET_DAYS - 1).is_err());
    }

    #[test]
    fn extreme_offsets_reject() {
        assert_matches!(validate_offset_days(i32::MIN), Err(CoreError::Validation(_)));
        assert_matches!(validate_offset_days(i32::MAX), Err(CoreError::Validation(_)));
    }

    #[test]
    fn title_limit_counts_characters() {
        assert!(validate_item_title(&"日".repeat(MAX_ITEM_TITLE_LENGTH)).is_ok());
        assert!(validate_item_title(&"日".repeat(MAX_ITEM_TITLE_LENGTH + 1)).is_err());
    }

    // -- tree ----------------------------------------------------------------

    #[test]
    fn eligible_parents_for_root_excludes_whole_chain() {
        assert!(eligible_parents(chain(), A).is_empty());
    }

    #[test]
    fn eligible_parents_for_leaf_excludes_only_itself() {
        assert_eq!(eligible_parents(chain(), C), vec![A, B]);
    }

    #[test]
    fn eligible_parents_for_middle_excludes_descendants() {
        let mut items = chain();
        items.push((4, None));
        assert_eq!(eligible_parents(items, B), vec![A, 4]);
    }

    #[test]
    fn descendant_walk_stops_on_existing_cycle() {
        let parents: HashMap<DbId, Option<DbId>> =
            [(A, Some(B)), (B, Some(A)), (C, None)].into_iter().collect();
        assert!(!is_descendant(&parents, A, C));
    }

    #[test]
    fn assigning_descendant_as_parent_rejects() {
        assert_matches!(
            validate_parent_assignment(chain(), A, Some(C)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn assigning_self_as_parent_rejects() {
        assert!(validate_parent_assignment(chain(), B, Some(B)).is_err());
    }

    #[test]
    fn assigning_foreign_parent_rejects() {
        assert!(validate_parent_assignment(chain(), B, Some(99)).is_err());
    }

    #[test]
    fn assigning_ancestor_or_none_is_fine() {
        assert!(validate_parent_assignment(chain(), C, Some(A)).is_ok());
        assert!(validate_parent_assignment(chain(), C, None).is_ok());
    }

    #[test]
    fn new_item_parent_must_be_in_scope() {
        assert!(validate_new_parent([A, B], Some(B)).is_ok());
        assert!(validate_new_parent([A, B], None).is_ok());
        assert!(validate_new_parent([A, B], Some(C)).is_err());
    }
}
