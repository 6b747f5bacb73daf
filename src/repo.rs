//! Git repository operations used by the release workflow.
//!
//! The [`VersionControl`] trait is the seam between the orchestrator and git.
//! [`Repository`] implements it on top of `git2` for an already checked-out
//! working copy: reading the latest commit, diffing it against its parent,
//! listing and creating tags, pushing them and walking commit ranges for
//! release notes.
//!
//! # Authentication
//!
//! Pushing uses `GH_TOKEN` / `GITHUB_TOKEN` when provided, then falls back to
//! ssh-agent and the git credential helpers configured for the repository.
use git2::{
    CredentialType, DescribeFormatOptions, DescribeOptions, RemoteCallbacks,
    Sort,
};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// Username sent alongside a token for HTTPS pushes to GitHub.
const TOKEN_USERNAME: &str = "x-access-token";

/// Credential callbacks are retried by libgit2 until one succeeds, so cap the
/// number of attempts to avoid looping on bad credentials.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

const FALLBACK_TAGGER_NAME: &str = "monotag";
const FALLBACK_TAGGER_EMAIL: &str = "monotag@users.noreply.github.com";

/// One-line view of a commit used in release notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Full commit SHA.
    pub sha: String,
    /// Abbreviated SHA as printed by `git log --oneline`.
    pub short_sha: String,
    /// First line of the commit message.
    pub summary: String,
}

/// Version control operations required by the release workflow.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// Full message of the commit HEAD points to.
    fn latest_commit_message(&self) -> Result<String>;

    /// Paths changed between HEAD and its first parent, using `/` separators.
    fn changed_paths(&self) -> Result<Vec<String>>;

    /// Tag names matching a glob pattern (`git tag -l <pattern>`).
    fn list_tags(&self, pattern: &str) -> Result<Vec<String>>;

    /// Create an annotated tag on HEAD.
    fn create_tag(&self, tag: &str, message: &str) -> Result<()>;

    /// Push a local tag to the named remote.
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Nearest tag reachable from `rev` (`git describe --tags --abbrev=0`).
    fn nearest_tag(&self, rev: &str) -> Result<Option<String>>;

    /// Commits reachable from `to` but not from `from`, newest first,
    /// optionally limited to messages containing `grep`.
    fn commits_between(
        &self,
        from: &str,
        to: &str,
        grep: Option<String>,
    ) -> Result<Vec<CommitSummary>>;
}

/// Create authentication callbacks for pushing.
///
/// A token takes precedence for HTTPS remotes. Otherwise ssh-agent is tried
/// for ssh remotes and the configured git credential helpers for everything
/// else.
fn get_auth_callbacks<'r>(
    token: Option<SecretString>,
    git_config: git2::Config,
) -> RemoteCallbacks<'r> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(
                "authentication failed: no valid credentials found",
            ));
        }

        if let Some(token) = &token
            && allowed.contains(CredentialType::USER_PASS_PLAINTEXT)
        {
            return git2::Cred::userpass_plaintext(
                TOKEN_USERNAME,
                token.expose_secret(),
            );
        }

        if allowed.contains(CredentialType::SSH_KEY)
            && let Some(username) = username
        {
            return git2::Cred::ssh_key_from_agent(username);
        }

        git2::Cred::credential_helper(&git_config, url, username)
    });

    // a rejected ref update does not fail `push` on its own
    callbacks.push_update_reference(|refname, status| match status {
        Some(msg) => Err(git2::Error::from_str(&format!(
            "remote rejected {refname}: {msg}"
        ))),
        None => Ok(()),
    });

    callbacks
}

/// Git working copy backed by `git2`.
pub struct Repository {
    repo: git2::Repository,
    token: Option<SecretString>,
    dry_run: bool,
}

impl Repository {
    /// Open the repository containing `path`.
    ///
    /// Discovery walks up parent directories, so any path inside the working
    /// copy is accepted. Bare repositories are rejected because manifests are
    /// read from the working directory.
    pub fn open(
        path: &Path,
        token: Option<SecretString>,
        dry_run: bool,
    ) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;

        if repo.is_bare() {
            return Err(ReleaseError::invalid_config(format!(
                "repository at {} has no working directory",
                path.display()
            )));
        }

        Ok(Self {
            repo,
            token,
            dry_run,
        })
    }

    /// Working directory of the repository.
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf).ok_or_else(|| {
            ReleaseError::invalid_config("repository has no working directory")
        })
    }

    fn tagger(&self) -> Result<git2::Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(err) => {
                debug!(
                    "git user not configured ({}): tagging as {FALLBACK_TAGGER_NAME}",
                    err.message()
                );
                Ok(git2::Signature::now(
                    FALLBACK_TAGGER_NAME,
                    FALLBACK_TAGGER_EMAIL,
                )?)
            }
        }
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        Ok(self.repo.head()?.peel_to_commit()?)
    }

    fn resolve_commit(&self, rev: &str) -> Result<git2::Commit<'_>> {
        Ok(self.repo.revparse_single(rev)?.peel_to_commit()?)
    }
}

impl VersionControl for Repository {
    fn latest_commit_message(&self) -> Result<String> {
        let commit = self.head_commit()?;
        let message = String::from_utf8_lossy(commit.message_bytes());
        Ok(message.trim().to_string())
    }

    fn changed_paths(&self) -> Result<Vec<String>> {
        let head = self.head_commit()?;
        let new_tree = head.tree()?;

        // only a real root commit is compared against the empty tree: in a
        // shallow clone the boundary commit also reports no parents
        let old_tree = if head.parent_count() > 0 {
            Some(head.parent(0)?.tree()?)
        } else if self.repo.is_shallow() {
            return Err(ReleaseError::transient(format!(
                "HEAD {} has no parent in this shallow clone: fetch at least \
                 two commits to diff the latest commit",
                head.id()
            )));
        } else {
            None
        };

        let diff =
            self.repo
                .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None)?;

        let paths = diff
            .deltas()
            .filter_map(|delta| {
                delta.new_file().path().or_else(|| delta.old_file().path())
            })
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect::<Vec<String>>();

        debug!("changed paths in HEAD: {:?}", paths);

        Ok(paths)
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        let names = self.repo.tag_names(Some(pattern))?;
        Ok(names.iter().flatten().map(String::from).collect())
    }

    fn create_tag(&self, tag: &str, message: &str) -> Result<()> {
        if self.dry_run {
            warn!("dry_run: would create tag {tag}");
            return Ok(());
        }

        info!("creating tag: {tag}");
        let head = self.head_commit()?;
        let tagger = self.tagger()?;

        self.repo
            .tag(tag, head.as_object(), &tagger, message, false)?;

        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        if self.dry_run {
            warn!("dry_run: would push tag {tag} to {remote}");
            return Ok(());
        }

        info!("pushing tag {tag} to {remote}");
        let git_config = self.repo.config()?.snapshot()?;
        let callbacks = get_auth_callbacks(self.token.clone(), git_config);
        let mut push_opts = git2::PushOptions::default();
        push_opts.remote_callbacks(callbacks);

        let mut remote = self.repo.find_remote(remote)?;

        let ref_spec = format!("refs/tags/{tag}:refs/tags/{tag}");
        remote.push(&[ref_spec], Some(&mut push_opts))?;

        Ok(())
    }

    fn nearest_tag(&self, rev: &str) -> Result<Option<String>> {
        let object = match self.repo.revparse_single(rev) {
            Ok(object) => object,
            Err(err) if err.code() == git2::ErrorCode::NotFound => {
                debug!("revision {rev} not found: no preceding tag");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let mut opts = DescribeOptions::new();
        opts.describe_tags();

        let describe = match object.describe(&opts) {
            Ok(describe) => describe,
            Err(err) if err.code() == git2::ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        // abbreviated size 0 prints only the tag name
        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);

        Ok(Some(describe.format(Some(&format))?))
    }

    fn commits_between(
        &self,
        from: &str,
        to: &str,
        grep: Option<String>,
    ) -> Result<Vec<CommitSummary>> {
        let from = self.resolve_commit(from)?.id();
        let to = self.resolve_commit(to)?.id();

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        walk.push(to)?;
        walk.hide(from)?;

        let mut commits = vec![];

        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;

            if let Some(needle) = &grep {
                let message = String::from_utf8_lossy(commit.message_bytes());
                if !message.contains(needle.as_str()) {
                    continue;
                }
            }

            let short_sha = commit
                .as_object()
                .short_id()?
                .as_str()
                .unwrap_or_default()
                .to_string();

            commits.push(CommitSummary {
                sha: commit.id().to_string(),
                short_sha,
                summary: commit.summary().unwrap_or_default().to_string(),
            });
        }

        Ok(commits)
    }
}
