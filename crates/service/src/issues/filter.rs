//! Query-string filtering over a project collection.
//!
//! Each filter key is matched independently against the whole collection by
//! string prefix (so `created_on=2025-03-25` selects by day). Key results are
//! intersected in request order, but a key that matches nothing is skipped,
//! and an intersection that runs empty is refilled by the next matching key.
//! If nothing survives, the unfiltered collection is returned.

use std::collections::BTreeSet;

use super::domain::Issue;

/// Whether `issue`'s field `key` equals or starts with `value`.
pub fn matches(issue: &Issue, key: &str, value: &str) -> bool {
    // equality is the full-length prefix case
    issue.field_text(key).is_some_and(|text| text.starts_with(value))
}

/// Apply `filters` (in order) to `issues`, preserving collection order.
pub fn apply_filters(issues: Vec<Issue>, filters: &[(String, String)]) -> Vec<Issue> {
    if filters.is_empty() {
        return issues;
    }

    let mut selected: BTreeSet<usize> = BTreeSet::new();
    for (key, value) in filters {
        let hits: BTreeSet<usize> = issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| matches(issue, key, value))
            .map(|(pos, _)| pos)
            .collect();
        if hits.is_empty() {
            continue;
        }
        selected = if selected.is_empty() {
            hits
        } else {
            selected.intersection(&hits).copied().collect()
        };
    }

    if selected.is_empty() {
        return issues;
    }
    issues
        .into_iter()
        .enumerate()
        .filter(|(pos, _)| selected.contains(pos))
        .map(|(_, issue)| issue)
        .collect()
}
