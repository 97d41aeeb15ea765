//! Top-level view composition

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::models::{RenderNode, RepositoryState};
use crate::services::navigation::{build_menu, render_tree, ExpandState};
use crate::services::session_store::SessionStore;

/// What the window should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RootView {
    /// No repository: the "open repository" prompt
    #[serde(rename_all = "camelCase")]
    OpenPrompt {
        /// Open button is disabled while a load runs
        is_loading: bool,
        error: Option<String>,
    },
    /// Repository loaded: sidebar menu plus content area
    #[serde(rename_all = "camelCase")]
    Workspace {
        repository_name: String,
        repository_path: String,
        /// Name of the checked-out branch; none when detached or unborn
        current_branch: Option<String>,
        menu: Vec<RenderNode>,
        is_loading: bool,
        error: Option<String>,
        notice: Option<String>,
    },
}

impl RootView {
    /// Derive the view from a session snapshot
    pub fn from_state(state: &RepositoryState, expand: &ExpandState) -> Self {
        let error = state.error.clone().filter(|e| !e.is_empty());

        match &state.repository {
            None => RootView::OpenPrompt {
                is_loading: state.is_loading,
                error,
            },
            Some(repository) => {
                let menu = build_menu(Some(repository.branches.as_slice()));
                RootView::Workspace {
                    repository_name: repository.name(),
                    repository_path: repository.path.clone(),
                    current_branch: repository.current_branch().map(|b| b.name.clone()),
                    menu: render_tree(&menu, expand),
                    is_loading: state.is_loading,
                    error,
                    notice: state.notice.clone(),
                }
            }
        }
    }
}

/// Composes the session store with the menu's expand state
pub struct RootViewController {
    store: Arc<SessionStore>,
    expand: Mutex<ExpandState>,
}

impl RootViewController {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            expand: Mutex::new(ExpandState::default()),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn render(&self) -> RootView {
        RootView::from_state(&self.store.state(), &self.expand())
    }

    /// Expand or collapse a menu node and return the new view
    pub fn toggle(&self, id: &str) -> RootView {
        let expanded = self.expand().toggle(id);
        tracing::trace!("Menu node {} expanded: {}", id, expanded);
        self.render()
    }

    fn expand(&self) -> MutexGuard<'_, ExpandState> {
        // Expand state is plain data; a poisoned lock still holds a usable value
        self.expand.lock().unwrap_or_else(|e| e.into_inner())
    }
}
