//! Scratch git repositories for tests

#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

/// Repository in a temp dir that is removed on drop
pub struct TestRepo {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    /// Repository with an unborn `main` and no commits
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().to_path_buf();
        let repo = Repository::init(&path).expect("init");
        repo.set_head("refs/heads/main").expect("unborn main");
        Self { _dir: dir, path }
    }

    /// `main` with one commit adding README.md
    pub fn seeded() -> Self {
        let repo = Self::empty();
        repo.commit("Initial commit", &[("README.md", "# flux\n")]);
        repo
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn open(&self) -> Repository {
        Repository::open(&self.path).expect("open")
    }

    /// Write a working-tree file, creating parent dirs
    pub fn write(&self, name: &str, content: &str) {
        let file = self.path.join(name);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).expect("parent dirs");
        }
        fs::write(file, content).expect("write file");
    }

    pub fn stage(&self, name: &str) {
        let repo = self.open();
        let mut index = repo.index().expect("index");
        index.add_path(Path::new(name)).expect("stage");
        index.write().expect("write index");
    }

    /// Write, stage and commit `files` on HEAD
    pub fn commit(&self, message: &str, files: &[(&str, &str)]) -> Oid {
        for (name, content) in files {
            self.write(name, content);
            self.stage(name);
        }

        let repo = self.open();
        let tree_id = repo.index().and_then(|mut i| i.write_tree()).expect("tree");
        let tree = repo.find_tree(tree_id).expect("find tree");
        let sig = Signature::now("Flux Tester", "tester@flux.dev").expect("signature");
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }

    /// Branch `name` at HEAD without checking it out
    pub fn branch(&self, name: &str) {
        let repo = self.open();
        let head = repo.head().and_then(|h| h.peel_to_commit()).expect("head commit");
        repo.branch(name, &head, false).expect("branch");
    }

    pub fn head_oid(&self) -> Oid {
        self.open().refname_to_id("HEAD").expect("head oid")
    }

    pub fn head_branch(&self) -> String {
        self.open()
            .head()
            .ok()
            .and_then(|h| h.shorthand().map(str::to_string))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_repo_has_main() {
        let repo = TestRepo::seeded();
        assert_eq!(repo.head_branch(), "main");
        assert!(repo.path.join(".git").exists());
    }

    #[test]
    fn test_commits_chain_on_head() {
        let repo = TestRepo::seeded();
        let first = repo.head_oid();
        let second = repo.commit("Second", &[("a.txt", "a")]);
        let opened = repo.open();
        let commit = opened.find_commit(second).unwrap();
        assert_eq!(commit.parent_id(0).unwrap(), first);
    }
}
