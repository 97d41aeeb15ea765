//! Session state and the actions that drive it

use serde::Serialize;

use super::{Branch, Repository};

/// Everything the UI needs to know about the open repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryState {
    pub repository: Option<Repository>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Startup found nothing to restore; the open prompt should be shown
    pub needs_initial_selection: bool,
    /// Non-blocking message from a failed background refresh
    pub notice: Option<String>,
}

/// Transitions accepted by [`crate::services::session_store::reduce`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    LoadingStart,
    LoadingSuccess(Repository),
    LoadingError(String),
    CloseRepository,
    UpdateBranches(Vec<Branch>),
    UpdateIndex(Vec<String>),
    ClearError,
    RestorationEmpty,
    RefreshFailed {
        notice: String,
        previous_error: Option<String>,
    },
    DismissNotice,
}

/// Dominant UI mode derived from a [`RepositoryState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    AwaitingSelection,
    Loaded,
    Errored,
}

impl RepositoryState {
    /// State before the previous session has been restored
    pub fn restoring() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Loading
        } else if self.error.is_some() {
            SessionPhase::Errored
        } else if self.repository.is_some() {
            SessionPhase::Loaded
        } else if self.needs_initial_selection {
            SessionPhase::AwaitingSelection
        } else {
            SessionPhase::Uninitialized
        }
    }

    /// Path of the loaded repository, if any
    pub fn repository_path(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.path.as_str())
    }

    /// Branches of the loaded repository, or none
    pub fn branches(&self) -> Option<&[Branch]> {
        self.repository.as_ref().map(|r| r.branches.as_slice())
    }
}
