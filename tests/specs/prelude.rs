//! Test helpers for behavioral specifications.
//!
//! Black-box DSL for driving the `ao` CLI (and, transitively, the `aod`
//! daemon it auto-starts) the way a real user would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const AO_TIMEOUT_CONNECT_MS: &str = "2000";
const AO_TIMEOUT_IPC_MS: &str = "1000";

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Resolve a built binary, falling back to the path relative to the test
/// binary itself when `CARGO_MANIFEST_DIR` points at a stale location.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn ao_binary() -> PathBuf {
    binary_path("ao")
}

fn aod_binary() -> PathBuf {
    binary_path("aod")
}

pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("AO_DAEMON_BIN".into(), aod_binary().to_string_lossy().into()),
                ("AO_TIMEOUT_CONNECT_MS".into(), AO_TIMEOUT_CONNECT_MS.into()),
                ("AO_TIMEOUT_IPC_MS".into(), AO_TIMEOUT_IPC_MS.into()),
            ],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(ao_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd.env_remove("AO_STATE_DIR");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Temporary project with an isolated daemon state directory.
pub struct Project {
    dir: tempfile::TempDir,
    state_dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            state_dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Run an `ao` command scoped to this project's isolated state dir.
    pub fn ao(&self) -> CliBuilder {
        cli().pwd(self.path()).env("AO_STATE_DIR", self.state_path())
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("daemon.log")).unwrap_or_else(|_| "(no daemon log)".into())
    }

    /// Register this project with the daemon using the offline-friendly
    /// `"noop"` plugins so specs don't depend on tmux/git being installed.
    pub fn register_offline(&self, project_id: &str) -> RunAssert {
        self.ao()
            .args(&[
                "register",
                project_id,
                self.path().to_str().expect("utf8 path"),
                "--runtime",
                "noop",
                "--agent",
                "noop",
                "--workspace",
                "noop",
            ])
            .passes()
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let mut cmd = self.ao().args(&["shutdown"]).command();
        cmd.stdout(std::process::Stdio::null());
        cmd.stderr(std::process::Stdio::null());
        let _ = cmd.status();
    }
}
