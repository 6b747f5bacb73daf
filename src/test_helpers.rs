//! Common test helper functions shared across test modules.
//!
//! Provides throwaway git repositories on disk so `git2`-backed code can be
//! exercised without touching the developer's checkout.
use std::{fs, path::Path};
use tempfile::TempDir;

/// Creates an empty git repository in a temporary directory with a
/// configured committer.
///
/// # Example
/// ```ignore
/// let (dir, git) = init_test_repo();
/// commit_files(&git, &[("README.md", "hi")], "initial commit");
/// ```
pub fn init_test_repo() -> (TempDir, git2::Repository) {
    let dir = TempDir::new().unwrap();
    let repo = git2::Repository::init(dir.path()).unwrap();

    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    (dir, repo)
}

/// Writes the given files into the working directory and commits them on
/// top of HEAD (or as the root commit for an empty repository).
pub fn commit_files(
    repo: &git2::Repository,
    files: &[(&str, &str)],
    message: &str,
) -> git2::Oid {
    let workdir = repo.workdir().unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = workdir.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = repo.signature().unwrap();

    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs = parents.iter().collect::<Vec<&git2::Commit>>();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Creates a bare repository and registers it as `origin` on `repo`.
pub fn add_bare_remote(repo: &git2::Repository) -> (TempDir, git2::Repository) {
    let dir = TempDir::new().unwrap();
    let bare = git2::Repository::init_bare(dir.path()).unwrap();
    repo.remote("origin", dir.path().to_str().unwrap()).unwrap();
    (dir, bare)
}

/// `package.json` content for a unit at the given version.
pub fn package_json(name: &str, version: &str) -> String {
    format!(
        "{{\n  \"name\": \"{name}\",\n  \"version\": \"{version}\",\n  \"private\": true\n}}\n"
    )
}
