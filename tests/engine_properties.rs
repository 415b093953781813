// tests/engine_properties.rs
//
// Property tests for the pure parts of the engine: project selection and
// summary arithmetic.

use std::path::PathBuf;
use std::time::SystemTime;

use proptest::prelude::*;

use runfleet::config::ProjectSpec;
use runfleet::engine::select_projects;
use runfleet::results::{ProjectResult, ProjectStatus, RunSummary};
use runfleet_test_utils::builders::ProjectSpecBuilder;

const TAG_POOL: &[&str] = &["backend", "frontend", "slow", "flaky"];

fn arb_projects() -> impl Strategy<Value = Vec<ProjectSpec>> {
    proptest::collection::vec(
        proptest::sample::subsequence(TAG_POOL.to_vec(), 0..=TAG_POOL.len()),
        0..8,
    )
    .prop_map(|tag_sets| {
        tag_sets
            .into_iter()
            .enumerate()
            .map(|(index, tags)| {
                let mut builder = ProjectSpecBuilder::new(&format!("project-{index}"));
                for tag in tags {
                    builder = builder.tag(tag);
                }
                builder.build()
            })
            .collect()
    })
}

fn arb_name_filter() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("project-[0-9]", 0..4)
}

fn arb_tag_filter() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(TAG_POOL.to_vec(), 0..=TAG_POOL.len())
        .prop_map(|tags| tags.into_iter().map(str::to_string).collect())
}

proptest! {
    #[test]
    fn selection_is_a_subsequence_of_the_input(
        projects in arb_projects(),
        names in arb_name_filter(),
        tags in arb_tag_filter(),
    ) {
        let input_names: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();
        let selected = select_projects(projects, &names, &tags);

        // Every selected project comes from the input, in input order.
        let mut cursor = 0;
        for project in &selected {
            let pos = input_names[cursor..]
                .iter()
                .position(|n| n == &project.name)
                .expect("selected project must exist later in the input");
            cursor += pos + 1;
        }
    }

    #[test]
    fn selection_is_idempotent(
        projects in arb_projects(),
        names in arb_name_filter(),
        tags in arb_tag_filter(),
    ) {
        let once = select_projects(projects, &names, &tags);
        let twice = select_projects(once.clone(), &names, &tags);

        let once_names: Vec<&str> = once.iter().map(|p| p.name.as_str()).collect();
        let twice_names: Vec<&str> = twice.iter().map(|p| p.name.as_str()).collect();
        prop_assert_eq!(once_names, twice_names);
    }

    #[test]
    fn no_filters_is_the_identity(projects in arb_projects()) {
        let input_names: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();
        let selected = select_projects(projects, &[], &[]);
        let selected_names: Vec<String> = selected.iter().map(|p| p.name.clone()).collect();
        prop_assert_eq!(input_names, selected_names);
    }

    #[test]
    fn every_selected_project_matches_the_filters(
        projects in arb_projects(),
        names in arb_name_filter(),
        tags in arb_tag_filter(),
    ) {
        let selected = select_projects(projects, &names, &tags);
        for project in &selected {
            if !names.is_empty() {
                prop_assert!(names.iter().any(|n| n.eq_ignore_ascii_case(&project.name)));
            }
            if !tags.is_empty() {
                prop_assert!(project.tags.iter().any(
                    |t| tags.iter().any(|f| f.eq_ignore_ascii_case(t))
                ));
            }
        }
    }

    #[test]
    fn summary_counts_always_sum_to_total(statuses in arb_statuses()) {
        let results: Vec<ProjectResult> = statuses.iter().map(|s| result_with(*s)).collect();
        let summary = RunSummary::compute(&results);

        prop_assert_eq!(summary.total, results.len());
        prop_assert_eq!(
            summary.passed + summary.failed + summary.errors + summary.skipped,
            summary.total
        );
    }

    #[test]
    fn success_rate_is_a_percentage(statuses in arb_statuses()) {
        let results: Vec<ProjectResult> = statuses.iter().map(|s| result_with(*s)).collect();
        let summary = RunSummary::compute(&results);

        prop_assert!(summary.success_rate >= 0.0);
        prop_assert!(summary.success_rate <= 100.0);
        if results.is_empty() {
            prop_assert_eq!(summary.success_rate, 0.0);
        }
    }
}

fn arb_statuses() -> impl Strategy<Value = Vec<ProjectStatus>> {
    proptest::collection::vec(
        prop_oneof![
            Just(ProjectStatus::Passed),
            Just(ProjectStatus::Failed),
            Just(ProjectStatus::Error),
            Just(ProjectStatus::Skipped),
        ],
        0..16,
    )
}

fn result_with(status: ProjectStatus) -> ProjectResult {
    let now = SystemTime::now();
    ProjectResult {
        name: "p".to_string(),
        path: PathBuf::from("."),
        tags: vec![],
        status,
        error: None,
        started_at: now,
        finished_at: now,
        commands: vec![],
    }
}
