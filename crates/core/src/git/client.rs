//! Clone-or-fetch of a local working copy.
//!
//! The working copy is treated as disposable: an existing checkout is forced
//! to the remote state with fetch + hard reset + clean, and a directory that
//! is not a checkout is deleted and cloned fresh. Local changes never survive
//! and nothing is ever merged.
//!
//! The remote is stored and passed on the command line without credentials.
//! The credential-embedded clone URL reaches git only through
//! `GIT_CONFIG_*` environment variables as a `url.<authed>.insteadOf`
//! rewrite, so the token never lands in argv or `.git/config`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use super::runner::CommandRunner;
use super::url::{build_clone_url, redact, validate_branch, validate_commit, GitUrl};
use super::GitError;

/// What to check out, and where.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    /// Remote URL in any form accepted by [`GitUrl`](super::GitUrl).
    pub url: String,
    pub user: Option<String>,
    pub token: Option<String>,
    pub branch: String,
    /// Pin the checkout to this commit (full object id) after syncing the
    /// branch.
    pub commit: Option<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A fresh shallow clone was made.
    Cloned,
    /// An existing checkout was forced to the remote state.
    Updated,
}

impl SyncOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cloned => "cloned",
            Self::Updated => "updated",
        }
    }
}

/// The remote as git sees it for one sync.
struct Remote<'a> {
    /// Credential-free HTTPS URL, used in argv and stored as `origin`.
    url: String,
    /// Extra environment carrying the credential rewrite, if any.
    env: Vec<(String, String)>,
    secret: Option<&'a str>,
}

impl<'a> Remote<'a> {
    fn resolve(request: &'a CloneRequest) -> Result<Self, GitError> {
        let parsed = GitUrl::parse(&request.url)?;
        let url = build_clone_url(&parsed, None, None)?;
        let authed = build_clone_url(&parsed, request.user.as_deref(), request.token.as_deref())?;
        let env = if authed == url {
            Vec::new()
        } else {
            credential_env(&authed, &url)
        };
        Ok(Self {
            url,
            env,
            secret: request.token.as_deref(),
        })
    }
}

/// Environment that makes git rewrite `plain` to `authed` for this process.
fn credential_env(authed: &str, plain: &str) -> Vec<(String, String)> {
    vec![
        ("GIT_CONFIG_COUNT".to_string(), "1".to_string()),
        ("GIT_CONFIG_KEY_0".to_string(), format!("url.{authed}.insteadOf")),
        ("GIT_CONFIG_VALUE_0".to_string(), plain.to_string()),
    ]
}

/// Lock-map key for a checkout path.
///
/// Checkout paths are built from validated hierarchical segments (no `..`),
/// so lexical normalization identifies a directory.
fn lock_key(path: &Path) -> PathBuf {
    path.components().collect()
}

pub struct GitClient<R: CommandRunner> {
    runner: R,
    /// One lock per checkout path; syncs of the same path run one at a time.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<R: CommandRunner> GitClient<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Bring `request.path` to the remote state of `request.branch`.
    ///
    /// All inputs are validated before touching the filesystem or spawning
    /// anything. Concurrent calls for the same path are serialized; calls for
    /// different paths run in parallel. Command failures are returned as-is;
    /// there is no retry.
    pub async fn clone_or_fetch(&self, request: &CloneRequest) -> Result<SyncOutcome, GitError> {
        validate_branch(&request.branch)?;
        if let Some(commit) = &request.commit {
            validate_commit(commit)?;
        }
        let remote = Remote::resolve(request)?;

        let key = lock_key(&request.path);
        let lock = self.path_lock(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.sync(request, &remote).await
        };
        self.release(&key, lock).await;
        result
    }

    async fn path_lock(&self, key: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.to_path_buf()).or_default().clone()
    }

    /// Drop the map entry once no other caller holds or waits on it.
    async fn release(&self, key: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }

    async fn sync(&self, request: &CloneRequest, remote: &Remote<'_>) -> Result<SyncOutcome, GitError> {
        let path = request.path.as_path();

        let outcome = if tokio::fs::try_exists(path.join(".git")).await? {
            self.update(path, &request.branch, remote).await?;
            SyncOutcome::Updated
        } else {
            self.fresh_clone(path, &request.branch, remote).await?;
            SyncOutcome::Cloned
        };

        if let Some(commit) = &request.commit {
            self.git(&["fetch", "--depth", "1", "origin", commit.as_str()], Some(path), remote)
                .await?;
            self.git(&["reset", "--hard", commit.as_str()], Some(path), remote)
                .await?;
        }

        tracing::info!(
            path = %path.display(),
            branch = %request.branch,
            outcome = outcome.as_str(),
            "Repository synchronized"
        );
        Ok(outcome)
    }

    async fn update(&self, path: &Path, branch: &str, remote: &Remote<'_>) -> Result<(), GitError> {
        // The remote may have moved; this also scrubs any stored credentials.
        self.git(&["remote", "set-url", "origin", remote.url.as_str()], Some(path), remote)
            .await?;
        self.git(&["fetch", "--depth", "1", "origin", branch], Some(path), remote)
            .await?;
        self.git(&["reset", "--hard", "FETCH_HEAD"], Some(path), remote)
            .await?;
        self.git(&["clean", "-fdx"], Some(path), remote).await?;
        Ok(())
    }

    async fn fresh_clone(&self, path: &Path, branch: &str, remote: &Remote<'_>) -> Result<(), GitError> {
        if let Ok(meta) = tokio::fs::symlink_metadata(path).await {
            tracing::warn!(path = %path.display(), "Removing non-git path before clone");
            if meta.is_dir() {
                tokio::fs::remove_dir_all(path).await?;
            } else {
                tokio::fs::remove_file(path).await?;
            }
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let target = path.to_string_lossy();
        self.git(
            &[
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--branch",
                branch,
                remote.url.as_str(),
                target.as_ref(),
            ],
            None,
            remote,
        )
        .await
    }

    /// Run one git subcommand and turn a non-zero exit into an error with the
    /// secret scrubbed from stderr.
    async fn git(&self, args: &[&str], cwd: Option<&Path>, remote: &Remote<'_>) -> Result<(), GitError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let output = self.runner.run(&args, cwd, &remote.env).await?;
        if output.exit_code != 0 {
            return Err(GitError::CommandFailed {
                command: args.first().cloned().unwrap_or_default(),
                exit_code: output.exit_code,
                stderr: redact(output.stderr.trim(), remote.secret),
            });
        }
        Ok(())
    }
}
