//! Boundary to the repository backend and the OS directory picker

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{FluxError, Result};
use crate::models::{Branch, Repository};
use crate::services::git_service::GitService;

/// Arguments for the directory picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRequest {
    pub allow_multiple: bool,
    pub title: String,
}

impl DirectoryRequest {
    pub fn single(title: impl Into<String>) -> Self {
        Self {
            allow_multiple: false,
            title: title.into(),
        }
    }
}

/// Everything the session store needs from the outside world
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Load a full snapshot; fails when `path` is not a reachable repository
    async fn open_repository(&self, path: &str) -> Result<Repository>;

    /// `Ok(None)` when the user cancels; errors are platform faults only
    async fn choose_directory(&self, request: &DirectoryRequest) -> Result<Option<String>>;

    async fn list_branches(&self, path: &str) -> Result<Vec<Branch>> {
        Ok(self.open_repository(path).await?.branches)
    }

    async fn read_index(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.open_repository(path).await?.index)
    }
}

/// Source of user-selected directories
#[async_trait]
pub trait DirectoryChooser: Send + Sync {
    async fn choose(&self, request: &DirectoryRequest) -> Result<Option<String>>;
}

/// Chooser answering from a queue of prepared selections.
///
/// Used for headless runs (path given on the command line) and tests. An empty
/// queue behaves like a cancelled dialog.
#[derive(Default)]
pub struct PresetChooser {
    selections: Mutex<Vec<Option<String>>>,
}

impl PresetChooser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(path: impl Into<String>) -> Self {
        let chooser = Self::new();
        chooser.push(Some(path.into()));
        chooser
    }

    /// Queue the next answer; `None` simulates a cancel
    pub fn push(&self, selection: Option<String>) {
        if let Ok(mut selections) = self.selections.lock() {
            selections.insert(0, selection);
        }
    }
}

#[async_trait]
impl DirectoryChooser for PresetChooser {
    async fn choose(&self, _request: &DirectoryRequest) -> Result<Option<String>> {
        let mut selections = self
            .selections
            .lock()
            .map_err(|_| FluxError::Dialog("Lock poisoned".to_string()))?;
        Ok(selections.pop().flatten())
    }
}

/// Gateway reading repositories with git2 on the blocking pool
#[derive(Clone)]
pub struct GitGateway {
    git: GitService,
    chooser: Arc<dyn DirectoryChooser>,
}

impl GitGateway {
    pub fn new(git: GitService, chooser: Arc<dyn DirectoryChooser>) -> Self {
        Self { git, chooser }
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(GitService) -> Result<T> + Send + 'static,
    {
        let git = self.git.clone();
        tokio::task::spawn_blocking(move || f(git))
            .await
            .map_err(|e| FluxError::OperationFailed(format!("Task failed: {}", e)))?
    }
}

#[async_trait]
impl BackendGateway for GitGateway {
    async fn open_repository(&self, path: &str) -> Result<Repository> {
        let path = path.to_string();
        self.blocking(move |git| git.load_repository(&path)).await
    }

    async fn choose_directory(&self, request: &DirectoryRequest) -> Result<Option<String>> {
        self.chooser.choose(request).await
    }

    async fn list_branches(&self, path: &str) -> Result<Vec<Branch>> {
        let path = path.to_string();
        self.blocking(move |git| git.list_branches(&path)).await
    }

    async fn read_index(&self, path: &str) -> Result<Vec<String>> {
        let path = path.to_string();
        self.blocking(move |git| git.read_index(&path)).await
    }
}
