// src/engine/filter.rs

//! Project selection by name-list and/or tag-list.
//!
//! Filtering is orthogonal to enablement: a disabled project passes the
//! filter and is later reported as Skipped by the project runner, so the run
//! result still accounts for it.

use crate::config::ProjectSpec;

/// Select the subset of projects to run, preserving configuration order.
///
/// - No filters: everything, unchanged.
/// - `names`: keep projects whose name matches an entry (case-insensitive).
/// - `tags`: keep projects carrying at least one matching tag
///   (case-insensitive, OR across the tag list).
/// - Both: a project must pass both filters.
pub fn select_projects(
    all: Vec<ProjectSpec>,
    names: &[String],
    tags: &[String],
) -> Vec<ProjectSpec> {
    let mut selected = all;

    if !names.is_empty() {
        selected.retain(|p| names.iter().any(|n| n.eq_ignore_ascii_case(&p.name)));
    }

    if !tags.is_empty() {
        selected.retain(|p| {
            p.tags
                .iter()
                .any(|t| tags.iter().any(|f| f.eq_ignore_ascii_case(t)))
        });
    }

    selected
}
