//! Tests for `.snowdeploy.toml` and its command-line overrides.

use crate::support::*;

#[test]
fn test_config_selects_prefix_strategy() {
    let t = Test::new();
    t.file(
        ".snowdeploy.toml",
        "[discovery]\nstrategy = \"prefix\"\nprefix = \"jobs\"\n",
    );
    t.snowpark("jobs/nightly", "nightly_sp");
    let input = t.changed(&["jobs/nightly/main.py", "jobs/nightly/util.py"]);

    let output = t.deploy(&input, &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "jobs/nightly (2 changed)");
}

#[test]
fn test_flag_overrides_config() {
    let t = Test::new();
    t.file(".snowdeploy.toml", "[discovery]\nstrategy = \"prefix\"\n");
    t.snowpark("steps/orders/app", "orders_sp");
    let input = t.changed(&["steps/orders/app/main.py"]);

    // Walk finds the nested marker the prefix strategy would miss
    let output = t.deploy(&input, &["--strategy", "walk", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Processing Snowflake project in steps/orders/app");
}

#[test]
fn test_custom_marker_file() {
    let t = Test::new();
    t.file("pipelines/load/project.yml", "snowpark:\n  project_name: load_sp\n");
    let input = t.changed(&["pipelines/load/main.py"]);

    let output = t.deploy(&input, &["--marker", "project.yml", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Deploying Snowpark project: load_sp");
}

#[test]
fn test_connection_defaults_from_config() {
    let t = Test::new();
    t.file(
        ".snowdeploy.toml",
        "[connection]\nuser = \"CI_USER\"\nwarehouse = \"DEPLOY_WH\"\nstyle = \"flags\"\n",
    );
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/app.py"]);

    let output = t.deploy(&input, &["acme_dev", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "--user CI_USER --warehouse DEPLOY_WH --database DEVELOPMENT");
}

#[test]
fn test_invalid_prefix_rejected() {
    let t = Test::new();
    let input = t.changed(&[]);

    let output = t.deploy(&input, &["--prefix", "steps/nested"]);
    assert_exit_one(&output);
    assert_stderr_contains(&output, "discovery.prefix");
}
