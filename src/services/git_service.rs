//! Git service for reading repository snapshots

use std::path::Path;

use crate::error::{FluxError, Result};
use crate::models::{Branch, Commit, Repository};

/// Reads repository data through git2
#[derive(Debug, Clone)]
pub struct GitService {
    commit_limit: usize,
}

impl GitService {
    /// Create a new GitService loading at most `commit_limit` commits per branch
    pub fn new(commit_limit: usize) -> Self {
        Self { commit_limit }
    }

    /// Open `path` and build a full snapshot
    pub fn load_repository(&self, path: &str) -> Result<Repository> {
        let repo = open(path)?;

        Ok(Repository {
            path: path.to_string(),
            branches: self.collect_branches(&repo)?,
            head: head_reference(&repo)?,
            index: index_paths(&repo)?,
            uncommitted: uncommitted_paths(&repo)?,
        })
    }

    /// Local branches of the repository at `path`
    pub fn list_branches(&self, path: &str) -> Result<Vec<Branch>> {
        let repo = open(path)?;
        self.collect_branches(&repo)
    }

    /// Paths in the index of the repository at `path`
    pub fn read_index(&self, path: &str) -> Result<Vec<String>> {
        let repo = open(path)?;
        index_paths(&repo)
    }

    fn collect_branches(&self, repo: &git2::Repository) -> Result<Vec<Branch>> {
        let mut branches = Vec::new();

        for branch_result in repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = branch_result?;
            let name = branch.name()?.unwrap_or("").to_string();
            let is_current = branch.is_head();

            let commits = match branch.get().target() {
                Some(tip) => self.history(repo, tip)?,
                None => Vec::new(),
            };

            branches.push(Branch {
                name,
                commits,
                is_current,
            });
        }

        Ok(branches)
    }

    /// Commits reachable from `tip`, newest first
    fn history(&self, repo: &git2::Repository, tip: git2::Oid) -> Result<Vec<Commit>> {
        let mut revwalk = repo.revwalk()?;
        revwalk.push(tip)?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk.take(self.commit_limit) {
            let commit = repo.find_commit(oid?)?;
            commits.push(Commit::from_git2(&commit)?);
        }

        Ok(commits)
    }
}

impl Default for GitService {
    fn default() -> Self {
        Self::new(200)
    }
}

fn open(path: &str) -> Result<git2::Repository> {
    let repo_path = Path::new(path);

    if !repo_path.exists() {
        return Err(FluxError::RepositoryNotFound(path.to_string()));
    }

    if !repo_path.is_dir() {
        return Err(FluxError::InvalidPath(path.to_string()));
    }

    Ok(git2::Repository::open(repo_path)?)
}

/// `refs/heads/<name>` when HEAD is symbolic (even if unborn), else the hash
fn head_reference(repo: &git2::Repository) -> Result<String> {
    let head = repo.find_reference("HEAD")?;

    if let Some(target) = head.symbolic_target() {
        return Ok(target.to_string());
    }

    Ok(head.target().map(|oid| oid.to_string()).unwrap_or_default())
}

fn index_paths(repo: &git2::Repository) -> Result<Vec<String>> {
    let index = repo.index()?;
    Ok(index
        .iter()
        .map(|entry| String::from_utf8_lossy(&entry.path).to_string())
        .collect())
}

fn uncommitted_paths(repo: &git2::Repository) -> Result<Vec<String>> {
    if repo.is_bare() {
        return Ok(Vec::new());
    }

    let mut opts = git2::StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let worktree_changes = git2::Status::WT_NEW
        | git2::Status::WT_MODIFIED
        | git2::Status::WT_DELETED
        | git2::Status::WT_RENAMED
        | git2::Status::WT_TYPECHANGE;

    let statuses = repo.statuses(Some(&mut opts))?;
    Ok(statuses
        .iter()
        .filter(|entry| entry.status().intersects(worktree_changes))
        .filter_map(|entry| entry.path().map(|p| p.to_string()))
        .collect())
}
