//! Tests for usage errors and fatal failures.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_missing_arguments_exit_one() {
    let t = Test::new();

    t.cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));

    t.cmd().arg(t.root_path()).assert().code(1);
}

#[test]
fn test_help_exits_zero() {
    let t = Test::new();
    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<ROOT>").and(predicate::str::contains("--dry-run")));
}

#[test]
fn test_invalid_target_rejected_before_secrets() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/app.py"]);
    // Unreadable secrets file: reaching the secret source would fail differently
    let missing = t.work.path().join("no-such-secrets.json");

    for token in ["acmeprod", "acme_staging", "_prod", "acme_"] {
        let output = t.deploy(
            &input,
            &[token, "--secrets-file", &missing.display().to_string()],
        );
        assert_exit_one(&output);
        assert_stderr_contains(&output, "target");
        assert!(!stderr(&output).contains("no-such-secrets"));
    }
}

#[test]
fn test_missing_root() {
    let t = Test::new();
    let input = t.changed(&["steps/orders/app.py"]);

    let output = t
        .cmd()
        .arg(t.work.path().join("nope"))
        .arg(&input)
        .output()
        .unwrap();
    assert_exit_one(&output);
    assert_stderr_contains(&output, "root directory not found");
}

#[test]
fn test_missing_changed_files_list() {
    let t = Test::new();
    let missing = t.work.path().join("changed_files.txt");

    let output = t.deploy(&missing, &[]);
    assert_exit_one(&output);
    assert_stderr_contains(&output, "failed to read");
}

#[test]
fn test_invalid_manifest_yaml() {
    let t = Test::new();
    let input = t.work_file("deploy.yml", "projects: [unclosed\n");

    let output = t.deploy(&input, &["--strategy", "manifest"]);
    assert_exit_one(&output);
    assert_stderr_contains(&output, "invalid YAML");
}

#[test]
fn test_missing_credential_in_bundle() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/app.py"]);
    let secrets = t.work_file("secrets.json", r#"{"ACME_MIG_ACCOUNT": "xy12345"}"#);

    let output = t.deploy(
        &input,
        &["acme_prod", "--secrets-file", &secrets.display().to_string()],
    );
    assert_exit_one(&output);
    assert_stderr_contains(&output, "ACME_MIG_ROLE");
}

#[test]
fn test_wrong_passphrase() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/app.py"]);
    let bundle = secret_bundle("acme").replace(PASSPHRASE, "not-the-passphrase");
    let secrets = t.work_file("secrets.json", &bundle);

    let output = t.deploy(
        &input,
        &["acme_prod", "--secrets-file", &secrets.display().to_string()],
    );
    assert_exit_one(&output);
    assert_stderr_contains(&output, "private key");
}

#[test]
fn test_snow_not_found() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/app.py"]);

    let output = t.deploy(&input, &["--snow-bin", "snow-binary-that-does-not-exist"]);
    assert_exit_one(&output);
    assert_stderr_contains(&output, "not found on PATH");
    assert_stdout_contains(&output, "--snow-bin");
}

#[test]
fn test_unknown_config_key() {
    let t = Test::new();
    t.file(".snowdeploy.toml", "[deploy]\nparallel = true\n");
    let input = t.changed(&[]);

    let output = t.deploy(&input, &[]);
    assert_exit_one(&output);
    assert_stderr_contains(&output, "invalid config file");
}

#[test]
fn test_unsupported_key_scheme() {
    let t = Test::new();
    t.snowpark("steps/orders", "orders_sp");
    let input = t.changed(&["steps/orders/app.py"]);
    let pem = include_str!("../fixtures/rsa_pkcs12_3des.p8");
    let secrets = t.work_file("secrets.json", &bundle_with_key("acme", pem, "s3cret"));

    let output = t.deploy(
        &input,
        &["acme_prod", "--secrets-file", &secrets.display().to_string()],
    );
    assert_exit_one(&output);
    assert_stderr_contains(&output, "unsupported private key encryption algorithm");
    assert!(!stderr(&output).contains("malformed"));
    assert_stdout_contains(&output, "openssl pkcs8 -topk8 -v2 aes256");
}
