//! Tests for project discovery through the CLI.
//!
//! These use `--dry-run` so no deploy CLI is needed.

use crate::support::*;

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
}

#[test]
fn test_walk_finds_nearest_marker() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    t.file("steps/orders/src/handlers/app.py", "print('hi')\n");
    let input = t.changed(&["steps/orders/src/handlers/app.py"]);

    let output = t.deploy(&input, &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Deploying only updated Snowpark apps in");
    assert_stdout_contains(&output, "Processing Snowflake project in steps/orders");
    assert_stdout_contains(&output, "Deploying Snowpark project: orders_sp");
    assert_stdout_contains(&output, "snow snowpark build");
    assert_stdout_contains(&output, "snow snowpark deploy --replace");
}

#[test]
fn test_walk_ignores_root_marker() {
    let t = Test::new();
    t.file("snowflake.yml", "snowpark: {}\n");
    let input = t.changed(&["README.md", "tools/lint.py"]);

    let output = t.deploy(&input, &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "No updated Snowpark projects found. Skipping deployment.");
}

#[test]
fn test_walk_skips_ignored_directories() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/__pycache__/app.cpython-311.pyc"]);

    let output = t.deploy(&input, &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "No updated Snowpark projects found");
}

#[test]
fn test_prefix_groups_and_sorts() {
    let t = Test::new();
    t.snowpark("steps/foo", "foo_sp");
    t.snowpark("steps/bar", "bar_sp");
    let input = t.changed(&[
        "steps/foo/a.py",
        "steps/foo/b.py",
        "steps/bar/c.py",
        "README.md",
    ]);

    let output = t.deploy(&input, &["--strategy", "prefix", "--dry-run"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(position(&out, "steps/bar (1 changed)") < position(&out, "steps/foo (2 changed)"));
    assert!(
        position(&out, "Processing Snowflake project in steps/bar")
            < position(&out, "Processing Snowflake project in steps/foo")
    );
    assert!(!out.contains("README.md ("));
}

#[test]
fn test_prefix_without_marker_is_skipped() {
    let t = Test::new();
    let input = t.changed(&["steps/ghost/app.py"]);

    let output = t.deploy(&input, &["--strategy", "prefix", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Skipping steps/ghost, no snowflake.yml found.");
    assert_stdout_contains(&output, "skipped:");
}

#[test]
fn test_custom_prefix() {
    let t = Test::new();
    t.snowpark("jobs/nightly", "nightly_sp");
    let input = t.changed(&["jobs/nightly/main.py", "steps/other/main.py"]);

    let output = t.deploy(&input, &["--strategy", "prefix", "--prefix", "jobs", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Processing Snowflake project in jobs/nightly");
    assert!(!stdout(&output).contains("steps/other"));
}

#[test]
fn test_manifest_lists_projects() {
    let t = Test::new();
    t.snowpark("b/proj", "b_sp");
    t.snowpark("a/proj", "a_sp");
    let input = t.work_file("deploy.yml", "projects:\n  - b/proj\n  - a/proj/\n  - a/proj\n");

    let output = t.deploy(&input, &["--strategy", "manifest", "--dry-run"]);
    assert_success(&output);

    let out = stdout(&output);
    assert_eq!(out.matches("Processing Snowflake project in a/proj").count(), 1);
    assert!(
        position(&out, "Processing Snowflake project in a/proj")
            < position(&out, "Processing Snowflake project in b/proj")
    );
}

#[test]
fn test_empty_manifest() {
    let t = Test::new();
    let input = t.work_file("deploy.yml", "");

    let output = t.deploy(&input, &["--strategy", "manifest"]);
    assert_success(&output);
    assert_stdout_contains(&output, "No projects listed in manifest. Skipping deployment.");
}

#[test]
fn test_empty_changed_files_exit_zero() {
    let t = Test::new();
    let input = t.work_file("changed_files.txt", "");

    let output = t.deploy(&input, &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "No updated Snowpark projects found. Skipping deployment.");
}

#[test]
fn test_non_snowpark_project_skipped() {
    let t = Test::new();
    t.project("apps/dashboard", "streamlit:\n  title: Dashboard\n");
    let input = t.changed(&["apps/dashboard/app.py"]);

    let output = t.deploy(&input, &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Skipping non-Snowpark project: apps/dashboard");
    assert!(!stdout(&output).contains("snow snowpark build"));
}

#[test]
fn test_unnamed_project() {
    let t = Test::new();
    t.project("steps/anon", "snowpark:\n  stage_name: dev\n");
    let input = t.changed(&["steps/anon/app.py"]);

    let output = t.deploy(&input, &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Deploying Snowpark project: Unnamed");
}
