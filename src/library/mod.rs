//! Grouped library view: a flat project list + category list folded into the
//! sections the sidebar/library page renders.

mod sync;

pub(crate) use sync::LibrarySyncController;

use crate::models::{Category, Project, ProjectGroup};
use std::collections::HashSet;

/// The UI shows at most this many projects per group; the rest collapse into
/// a "+N more" affordance.
pub(crate) const GROUP_PREVIEW_LIMIT: usize = 4;

pub(crate) const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Case-insensitive substring match on the title. An empty (or
/// whitespace-only) query matches everything.
pub(crate) fn matches_query(title: &str, query: &str) -> bool {
    let q = query.trim();
    if q.is_empty() {
        return true;
    }
    title.to_lowercase().contains(&q.to_lowercase())
}

/// Category existence lookups always consult the UNFILTERED category set,
/// independent of any active search.
pub(crate) fn category_name<'a>(categories: &'a [Category], id: &str) -> Option<&'a str> {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
}

fn sort_newest_first(projects: &mut [Project]) {
    // ISO-8601 strings order lexicographically; stable sort keeps input order
    // for equal timestamps.
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Fold projects + categories into display groups.
///
/// - search filter applies before grouping; groups with no matches are omitted
/// - the uncategorized group (when non-empty) always comes first
/// - category groups follow in server order
/// - a project whose `category_id` matches no known category lands in the
///   uncategorized group but keeps its `category_id` (grouping and dropdown
///   highlighting are independent computations)
pub(crate) fn group_projects(
    projects: &[Project],
    categories: &[Category],
    query: &str,
) -> Vec<ProjectGroup> {
    let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();

    let filtered: Vec<&Project> = projects
        .iter()
        .filter(|p| matches_query(&p.title, query))
        .collect();

    let mut groups: Vec<ProjectGroup> = Vec::with_capacity(categories.len() + 1);

    let mut uncategorized: Vec<Project> = filtered
        .iter()
        .filter(|p| {
            p.category_id
                .as_deref()
                .map(|id| !known.contains(id))
                .unwrap_or(true)
        })
        .map(|p| (*p).clone())
        .collect();

    if !uncategorized.is_empty() {
        sort_newest_first(&mut uncategorized);
        groups.push(ProjectGroup {
            category_id: None,
            name: UNCATEGORIZED_LABEL.to_string(),
            total_count: uncategorized.len(),
            projects: uncategorized,
        });
    }

    for cat in categories {
        let mut members: Vec<Project> = filtered
            .iter()
            .filter(|p| p.category_id.as_deref() == Some(cat.id.as_str()))
            .map(|p| (*p).clone())
            .collect();

        if members.is_empty() {
            continue;
        }

        sort_newest_first(&mut members);
        groups.push(ProjectGroup {
            category_id: Some(cat.id.clone()),
            name: cat.name.clone(),
            total_count: members.len(),
            projects: members,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, title: &str, category_id: Option<&str>, created_at: &str) -> Project {
        Project {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            category_id: category_id.map(|s| s.to_string()),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
            source_count: 1,
            first_source_id: None,
            status: None,
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn uncategorized_group_is_first_when_nonempty() {
        let projects = vec![
            project("p1", "alpha", Some("c1"), "2024-01-03T00:00:00Z"),
            project("p2", "beta", None, "2024-01-01T00:00:00Z"),
        ];
        let categories = vec![category("c1", "Work")];

        let groups = group_projects(&projects, &categories, "");
        assert_eq!(groups.len(), 2);
        assert!(groups[0].category_id.is_none());
        assert_eq!(groups[0].name, UNCATEGORIZED_LABEL);
        assert_eq!(groups[1].name, "Work");
    }

    #[test]
    fn category_groups_follow_server_order() {
        let projects = vec![
            project("p1", "a", Some("c2"), "2024-01-01T00:00:00Z"),
            project("p2", "b", Some("c1"), "2024-01-01T00:00:00Z"),
        ];
        // Server order: c2 before c1, regardless of names.
        let categories = vec![category("c2", "Zebra"), category("c1", "Apple")];

        let groups = group_projects(&projects, &categories, "");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Zebra");
        assert_eq!(groups[1].name, "Apple");
    }

    #[test]
    fn empty_groups_are_skipped() {
        let projects = vec![project("p1", "a", Some("c1"), "2024-01-01T00:00:00Z")];
        let categories = vec![category("c1", "Work"), category("c2", "Empty")];

        let groups = group_projects(&projects, &categories, "");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Work");
    }

    #[test]
    fn unknown_category_lands_uncategorized_but_keeps_id() {
        let projects = vec![project("p1", "a", Some("ghost"), "2024-01-01T00:00:00Z")];
        let categories = vec![category("c1", "Work")];

        let groups = group_projects(&projects, &categories, "");
        assert_eq!(groups.len(), 1);
        assert!(groups[0].category_id.is_none());
        // Highlighting is computed separately; the stale id survives.
        assert_eq!(groups[0].projects[0].category_id.as_deref(), Some("ghost"));
    }

    #[test]
    fn groups_sort_newest_first() {
        let projects = vec![
            project("old", "old", None, "2024-01-01T00:00:00Z"),
            project("new", "new", None, "2024-03-01T00:00:00Z"),
            project("mid", "mid", None, "2024-02-01T00:00:00Z"),
        ];

        let groups = group_projects(&projects, &[], "");
        let ids: Vec<&str> = groups[0].projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn preview_truncation_and_total_count() {
        let projects: Vec<Project> = (0..7)
            .map(|i| {
                project(
                    &format!("p{i}"),
                    &format!("t{i}"),
                    None,
                    &format!("2024-01-0{}T00:00:00Z", i + 1),
                )
            })
            .collect();

        let groups = group_projects(&projects, &[], "");
        let g = &groups[0];
        assert_eq!(g.total_count, 7);
        assert_eq!(g.visible().len(), GROUP_PREVIEW_LIMIT);
        assert!(g.total_count >= g.visible().len());
        assert_eq!(g.overflow(), 3);
        // Visible slice is the newest ones.
        assert_eq!(g.visible()[0].id, "p6");
    }

    #[test]
    fn search_filters_before_grouping() {
        let projects = vec![
            project("p1", "Rust ownership", Some("c1"), "2024-01-01T00:00:00Z"),
            project("p2", "French verbs", Some("c2"), "2024-01-01T00:00:00Z"),
        ];
        let categories = vec![category("c1", "Programming"), category("c2", "Languages")];

        let groups = group_projects(&projects, &categories, "RUST");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Programming");

        // Lookups still see the full category set.
        assert_eq!(category_name(&categories, "c2"), Some("Languages"));
    }

    #[test]
    fn blank_query_matches_everything() {
        assert!(matches_query("anything", ""));
        assert!(matches_query("anything", "   "));
        assert!(matches_query("Ownership in Rust", "in ru"));
        assert!(!matches_query("Ownership in Rust", "python"));
    }

    #[test]
    fn grouping_is_idempotent() {
        let projects = vec![
            project("p1", "a", Some("c1"), "2024-01-03T00:00:00Z"),
            project("p2", "b", Some("c1"), "2024-01-02T00:00:00Z"),
            project("p3", "c", None, "2024-01-01T00:00:00Z"),
            project("p4", "d", Some("missing"), "2024-01-04T00:00:00Z"),
        ];
        let categories = vec![category("c1", "Work")];

        let first = group_projects(&projects, &categories, "");

        // Flatten the grouped output and regroup: identical result. Note the
        // unknown-category project keeps its id, so it must re-partition the
        // same way.
        let flattened: Vec<Project> = first
            .iter()
            .flat_map(|g| g.projects.iter().cloned())
            .collect();
        let second = group_projects(&flattened, &categories, "");

        assert_eq!(first, second);
    }
}
