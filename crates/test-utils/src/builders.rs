#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use runfleet::config::ProjectSpec;

/// Builder for `ProjectSpec` to simplify engine test setup.
///
/// Defaults: enabled, path/working_dir ".", no commands, 60s timeout,
/// no retries (10ms delay when retries are enabled, to keep tests fast).
pub struct ProjectSpecBuilder {
    spec: ProjectSpec,
}

impl ProjectSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            spec: ProjectSpec {
                name: name.to_string(),
                path: PathBuf::from("."),
                working_dir: PathBuf::from("."),
                enabled: true,
                pre_commands: vec![],
                commands: vec![],
                post_commands: vec![],
                env: BTreeMap::new(),
                timeout: Duration::from_secs(60),
                tags: vec![],
                retry_count: 0,
                retry_delay: Duration::from_millis(10),
                ignore_exit_codes: vec![],
                expected_output_patterns: vec![],
                forbidden_output_patterns: vec![],
            },
        }
    }

    pub fn path(mut self, path: &str) -> Self {
        self.spec.path = PathBuf::from(path);
        self.spec.working_dir = PathBuf::from(path);
        self
    }

    pub fn working_dir(mut self, dir: &str) -> Self {
        self.spec.working_dir = PathBuf::from(dir);
        self
    }

    pub fn enabled(mut self, val: bool) -> Self {
        self.spec.enabled = val;
        self
    }

    pub fn pre(mut self, cmd: &str) -> Self {
        self.spec.pre_commands.push(cmd.to_string());
        self
    }

    pub fn main(mut self, cmd: &str) -> Self {
        self.spec.commands.push(cmd.to_string());
        self
    }

    pub fn post(mut self, cmd: &str) -> Self {
        self.spec.post_commands.push(cmd.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.spec.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.spec.timeout = timeout;
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.spec.tags.push(tag.to_string());
        self
    }

    pub fn retries(mut self, count: u32) -> Self {
        self.spec.retry_count = count;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.spec.retry_delay = delay;
        self
    }

    pub fn ignore_exit_code(mut self, code: i32) -> Self {
        self.spec.ignore_exit_codes.push(code);
        self
    }

    pub fn expect_output(mut self, pattern: &str) -> Self {
        self.spec.expected_output_patterns.push(pattern.to_string());
        self
    }

    pub fn forbid_output(mut self, pattern: &str) -> Self {
        self.spec.forbidden_output_patterns.push(pattern.to_string());
        self
    }

    pub fn build(self) -> ProjectSpec {
        self.spec
    }
}
