//! Commit models

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Commit information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub hash: String,
    pub author_name: String,
    pub timestamp: DateTime<Utc>,
    pub tree: Tree,
}

/// Top-level listing of a commit's tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub hash: String,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    /// Octal file mode, e.g. `100644` or `040000`
    pub mode: String,
    pub entry_type: String,
    pub hash: String,
    pub name: String,
}

impl Tree {
    pub fn from_git2(tree: &git2::Tree) -> Self {
        let entries = tree
            .iter()
            .map(|entry| TreeEntry {
                mode: format!("{:06o}", entry.filemode()),
                entry_type: entry
                    .kind()
                    .map(|k| k.str().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                hash: entry.id().to_string(),
                name: entry.name().unwrap_or("").to_string(),
            })
            .collect();

        Tree {
            hash: tree.id().to_string(),
            entries,
        }
    }
}

impl Commit {
    /// Convert a git2 commit, reading its root tree
    pub fn from_git2(commit: &git2::Commit) -> Result<Self, git2::Error> {
        let tree = commit.tree()?;
        let author = commit.author();
        let timestamp = Utc
            .timestamp_opt(author.when().seconds(), 0)
            .single()
            .unwrap_or_default();

        Ok(Commit {
            hash: commit.id().to_string(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            timestamp,
            tree: Tree::from_git2(&tree),
        })
    }
}
