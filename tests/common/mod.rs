//! Common test utilities for specdeck integration tests
//!
//! This module provides shared test infrastructure including:
//! - CLI invocation helpers running the compiled binary
//! - An isolated config directory per invocation
//! - Test fixture management

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Exit status codes matching the Rust application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    Interrupted = 130,
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            130 => ExitStatus::Interrupted,
            _ => ExitStatus::Error,
        }
    }
}

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit status code
    pub exit_status: ExitStatus,
    /// Raw exit code
    pub exit_code: i32,
}

impl CliResponse {
    /// Parse the whole of stdout as JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(self.stdout.trim()).ok()
    }

    /// Check if stdout contains a substring
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Everything after the first blank line of stdout
    pub fn body(&self) -> Option<&str> {
        self.stdout.find("\n\n").map(|pos| &self.stdout[pos + 2..])
    }

    /// Value of a `Name: value` header line printed by `build`
    pub fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}: ", name);
        self.stdout
            .lines()
            .take_while(|l| !l.is_empty())
            .find_map(|l| l.strip_prefix(prefix.as_str()))
    }

    /// First line of stdout
    pub fn first_line(&self) -> &str {
        self.stdout.lines().next().unwrap_or("")
    }
}

impl std::fmt::Display for CliResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stdout:\n{}\nstderr:\n{}", self.stdout, self.stderr)
    }
}

/// Mock environment for testing
pub struct MockEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    /// Environment variables to set
    pub env_vars: HashMap<String, String>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    /// Create a new mock environment
    pub fn new() -> Self {
        let config_dir = TempDir::new().expect("Failed to create temp config dir");
        Self {
            config_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Set an environment variable
    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Write `config.toml` into the config directory
    pub fn write_config(&self, content: &str) -> &Self {
        std::fs::write(self.config_dir.path().join("config.toml"), content)
            .expect("Failed to write config file");
        self
    }

    /// Get the config directory path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }
}

/// Run the CLI with the given arguments (excluding the program name)
pub fn specdeck(args: &[&str]) -> CliResponse {
    specdeck_with_env(args, &MockEnvironment::new())
}

/// Run the CLI with the given arguments and environment
pub fn specdeck_with_env(args: &[&str], env: &MockEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_specdeck"));
    cmd.args(args);

    // Isolate from the user's config and log settings
    cmd.env("SPECDECK_CONFIG_DIR", env.config_path());
    cmd.env_remove("SPECDECK_LOG");
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().expect("Failed to execute command");
    parse_output(output)
}

fn parse_output(output: Output) -> CliResponse {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(1);

    CliResponse {
        stdout,
        stderr,
        exit_status: ExitStatus::from(exit_code),
        exit_code,
    }
}

/// Create a temporary file with the given content
pub fn create_temp_file(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = dir.path().join(name);
    std::fs::write(&file_path, content).expect("Failed to write temp file");
    (dir, file_path)
}

/// Create a temporary JSON file
pub fn create_json_file(content: &serde_json::Value) -> (TempDir, PathBuf) {
    let json_str = serde_json::to_string_pretty(content).expect("Failed to serialize JSON");
    create_temp_file("spec.json", json_str.as_bytes())
}

/// Test fixture paths
pub mod fixtures {
    use once_cell::sync::Lazy;
    use std::path::PathBuf;

    pub static FIXTURES_DIR: Lazy<PathBuf> = Lazy::new(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
    });

    /// Get path to a fixture file
    pub fn fixture_path(name: &str) -> PathBuf {
        FIXTURES_DIR.join(name)
    }

    /// Fixture path as an owned string, for passing on the command line
    pub fn fixture_arg(name: &str) -> String {
        fixture_path(name).to_string_lossy().into_owned()
    }

    /// Read a fixture file
    pub fn read_fixture(name: &str) -> String {
        std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_from_i32() {
        assert_eq!(ExitStatus::from(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from(1), ExitStatus::Error);
        assert_eq!(ExitStatus::from(130), ExitStatus::Interrupted);
    }
}
