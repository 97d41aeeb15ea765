//! Repository models

use serde::{Deserialize, Serialize};

use super::Branch;

/// Snapshot of an opened repository as returned by the backend.
///
/// Identity is `path`. A snapshot is replaced wholesale on every successful
/// load; only the session store patches `branches` or `index` in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub path: String,
    pub branches: Vec<Branch>,
    /// Full symbolic reference of HEAD, or the commit hash when detached
    pub head: String,
    /// Paths currently recorded in the index
    pub index: Vec<String>,
    /// Working-tree paths with changes not yet staged
    #[serde(alias = "uncommited")]
    pub uncommitted: Vec<String>,
}

impl Repository {
    /// The branch HEAD points at, if any
    pub fn current_branch(&self) -> Option<&super::Branch> {
        self.branches.iter().find(|b| b.is_current)
    }

    /// Directory name of the repository, used as a display title
    pub fn name(&self) -> String {
        std::path::Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}
