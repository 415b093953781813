// tests/config_loading.rs
//
// TOML loading, defaults, and semantic validation.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use runfleet::config::load_and_validate;
use runfleet::errors::RunfleetError;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn expect_config_error(contents: &str, fragment: &str) {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(RunfleetError::ConfigError(msg)) => {
            assert!(
                msg.contains(fragment),
                "error message {msg:?} should contain {fragment:?}"
            );
        }
        other => panic!("expected ConfigError containing {fragment:?}, got {other:?}"),
    }
}

#[test]
fn full_config_round_trips_with_defaults_applied() {
    let file = write_config(
        r#"
        [settings]
        parallel = false
        max_parallel = 8
        stop_on_first_failure = true

        [project.api]
        path = "services/api"
        pre_commands = ["cargo fetch"]
        commands = ["cargo test"]
        post_commands = ["cargo clean"]
        env = { CI = "1" }
        tags = ["backend"]
        timeout_minutes = 3
        retry_count = 2
        retry_delay_secs = 1
        ignore_exit_codes = [101]
        expected_output_patterns = ["\\d+ passed"]

        [project.web]
        path = "web"
        working_dir = "web/app"
        commands = ["npm test"]
        "#,
    );

    let config = load_and_validate(file.path()).expect("valid config");

    let policy = config.policy();
    assert!(!policy.parallel);
    assert_eq!(policy.max_parallel, 8);
    assert!(policy.stop_on_first_failure);

    let specs = config.project_specs();
    assert_eq!(specs.len(), 2);

    let api = &specs[0];
    assert_eq!(api.name, "api");
    assert!(api.enabled);
    assert_eq!(api.working_dir.to_str(), Some("services/api"));
    assert_eq!(api.timeout, Duration::from_secs(180));
    assert_eq!(api.retry_count, 2);
    assert_eq!(api.retry_delay, Duration::from_secs(1));
    assert_eq!(api.ignore_exit_codes, vec![101]);
    assert_eq!(api.env.get("CI").map(String::as_str), Some("1"));

    let web = &specs[1];
    assert_eq!(web.name, "web");
    assert_eq!(web.working_dir.to_str(), Some("web/app"));
    // Unset fields fall back to their defaults.
    assert_eq!(web.timeout, Duration::from_secs(600));
    assert_eq!(web.retry_count, 0);
    assert_eq!(web.retry_delay, Duration::from_secs(5));
}

#[test]
fn minimal_config_defaults_working_dir_to_path() {
    let file = write_config(
        r#"
        [project.api]
        path = "services/api"
        commands = ["cargo test"]
        "#,
    );

    let config = load_and_validate(file.path()).expect("valid config");
    let specs = config.project_specs();

    assert_eq!(specs[0].working_dir, specs[0].path);
    // No [settings] section at all: policy defaults apply.
    let policy = config.policy();
    assert!(policy.parallel);
    assert_eq!(policy.max_parallel, 4);
    assert!(!policy.stop_on_first_failure);
}

#[test]
fn projects_come_out_in_stable_name_order() {
    let file = write_config(
        r#"
        [project.zeta]
        path = "z"

        [project.alpha]
        path = "a"
        "#,
    );

    let config = load_and_validate(file.path()).expect("valid config");
    let names: Vec<String> = config.project_specs().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/a/real/runfleet.toml");
    assert!(matches!(result, Err(RunfleetError::IoError(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("this is not toml [[[");
    let result = load_and_validate(file.path());
    assert!(matches!(result, Err(RunfleetError::TomlError(_))));
}

#[test]
fn config_without_projects_is_rejected() {
    expect_config_error(
        r#"
        [settings]
        parallel = true
        "#,
        "at least one",
    );
}

#[test]
fn empty_project_path_is_rejected() {
    expect_config_error(
        r#"
        [project.api]
        path = "  "
        commands = ["cargo test"]
        "#,
        "empty `path`",
    );
}

#[test]
fn zero_timeout_is_rejected() {
    expect_config_error(
        r#"
        [project.api]
        path = "services/api"
        commands = ["cargo test"]
        timeout_minutes = 0
        "#,
        "timeout_minutes",
    );
}

#[test]
fn zero_max_parallel_is_rejected() {
    expect_config_error(
        r#"
        [settings]
        max_parallel = 0

        [project.api]
        path = "services/api"
        "#,
        "max_parallel",
    );
}

#[test]
fn ignoring_exit_code_zero_is_rejected() {
    expect_config_error(
        r#"
        [project.api]
        path = "services/api"
        commands = ["cargo test"]
        ignore_exit_codes = [0, 1]
        "#,
        "exit code 0",
    );
}

#[test]
fn invalid_output_pattern_is_rejected() {
    expect_config_error(
        r#"
        [project.api]
        path = "services/api"
        commands = ["cargo test"]
        expected_output_patterns = ["[unclosed"]
        "#,
        "invalid output pattern",
    );
}

#[test]
fn empty_command_string_is_rejected() {
    expect_config_error(
        r#"
        [project.api]
        path = "services/api"
        commands = ["cargo test", "  "]
        "#,
        "empty command",
    );
}
