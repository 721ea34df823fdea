//! Execution port for git subcommands.
//!
//! [`GitClient`](super::GitClient) only builds argument lists; a
//! [`CommandRunner`] turns them into processes. [`ProcessRunner`] is the real
//! implementation. Tests substitute a recording fake.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use super::GitError;

/// Default wall-clock limit for a single git invocation.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Captured result of a finished git process.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `git <args>` in `cwd` (or the current directory) with `env` added
    /// to the inherited environment.
    ///
    /// Returns the captured output regardless of exit status. Only spawn
    /// failures and timeouts are errors here.
    async fn run(
        &self,
        args: &[String],
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<CommandOutput, GitError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    async fn run(
        &self,
        args: &[String],
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<CommandOutput, GitError> {
        (**self).run(args, cwd, env).await
    }
}

/// Runs the `git` binary as a child process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Use a different executable (e.g. an absolute path to git).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        args: &[String],
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<CommandOutput, GitError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            // Never block on an interactive credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let command = args.first().cloned().unwrap_or_default();
        let start = Instant::now();

        // On timeout the output future is dropped, which kills the child.
        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code().unwrap_or(-1),
            }),
            Ok(Err(e)) => Err(GitError::Io(e)),
            Err(_elapsed) => Err(GitError::Timeout {
                command,
                elapsed_ms: start.elapsed().as_millis() as u64,
            }),
        }
    }
}
