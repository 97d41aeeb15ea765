//! Branch models

use serde::{Deserialize, Serialize};

use super::Commit;

/// Local branch with its commit history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commits: Vec<Commit>,
    pub is_current: bool,
}

impl Branch {
    /// Branch without loaded history
    pub fn new(name: impl Into<String>, is_current: bool) -> Self {
        Self {
            name: name.into(),
            commits: Vec::new(),
            is_current,
        }
    }
}
