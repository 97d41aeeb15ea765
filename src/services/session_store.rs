//! Repository session store
//!
//! [`reduce`] is the pure transition function over [`RepositoryState`].
//! [`SessionStore`] runs the effects around it (dialog, backend, persistence)
//! and publishes every new state through a `watch` channel, so observers only
//! ever see whole snapshots.
//!
//! Loads are single-flight: each load takes a generation number when it
//! starts and its result is applied only if no newer load (or a close) has
//! started since.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{FluxError, Result};
use crate::models::{Branch, RepositoryState, SessionAction};
use crate::services::gateway::{BackendGateway, DirectoryRequest};
use crate::services::persistence::{PersistenceAdapter, LAST_REPOSITORY_KEY};

/// Message shown when the remembered repository can no longer be opened
pub const RESTORE_FAILED_MESSAGE: &str = "Failed to load previous repository";

/// Default title of the open-repository dialog
pub const DEFAULT_DIALOG_TITLE: &str = "Open Flux Repository";

/// How a load request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was applied to the session
    Applied,
    /// A newer load or a close started first; the result was dropped
    Superseded,
    /// The user dismissed the directory picker, or there was nothing to load
    Cancelled,
    /// A refresh failed; the view was kept and a notice recorded
    Failed,
}

/// Apply one action to a state
pub fn reduce(state: &RepositoryState, action: SessionAction) -> RepositoryState {
    match action {
        SessionAction::LoadingStart => RepositoryState {
            is_loading: true,
            error: None,
            needs_initial_selection: false,
            ..state.clone()
        },

        SessionAction::LoadingSuccess(repository) => RepositoryState {
            repository: Some(repository),
            ..RepositoryState::default()
        },

        SessionAction::LoadingError(message) => RepositoryState {
            is_loading: false,
            error: Some(message),
            needs_initial_selection: false,
            ..state.clone()
        },

        SessionAction::CloseRepository => RepositoryState::default(),

        SessionAction::UpdateBranches(branches) => match &state.repository {
            Some(repository) => {
                let mut repository = repository.clone();
                repository.branches = branches;
                RepositoryState {
                    repository: Some(repository),
                    ..state.clone()
                }
            }
            None => state.clone(),
        },

        SessionAction::UpdateIndex(index) => match &state.repository {
            Some(repository) => {
                let mut repository = repository.clone();
                repository.index = index;
                RepositoryState {
                    repository: Some(repository),
                    ..state.clone()
                }
            }
            None => state.clone(),
        },

        SessionAction::ClearError => RepositoryState {
            error: None,
            ..state.clone()
        },

        SessionAction::RestorationEmpty => RepositoryState {
            repository: None,
            is_loading: false,
            error: None,
            needs_initial_selection: true,
            notice: state.notice.clone(),
        },

        SessionAction::RefreshFailed {
            notice,
            previous_error,
        } => RepositoryState {
            is_loading: false,
            error: previous_error,
            notice: Some(notice),
            ..state.clone()
        },

        SessionAction::DismissNotice => RepositoryState {
            notice: None,
            ..state.clone()
        },
    }
}

/// Which entry point started a load; decides how failures are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Open,
    Refresh,
}

/// Generation and pre-load error captured when a load starts
#[derive(Default)]
struct LoadTicket {
    generation: u64,
    previous_error: Option<String>,
}

/// Owner of the session state and the persisted last-repository entry
pub struct SessionStore {
    state: watch::Sender<RepositoryState>,
    gateway: Arc<dyn BackendGateway>,
    persistence: Arc<dyn PersistenceAdapter>,
    generation: AtomicU64,
    restored: AtomicBool,
    dialog_title: String,
}

impl SessionStore {
    pub fn new(gateway: Arc<dyn BackendGateway>, persistence: Arc<dyn PersistenceAdapter>) -> Self {
        let (state, _) = watch::channel(RepositoryState::restoring());
        Self {
            state,
            gateway,
            persistence,
            generation: AtomicU64::new(0),
            restored: AtomicBool::new(false),
            dialog_title: DEFAULT_DIALOG_TITLE.to_string(),
        }
    }

    pub fn with_dialog_title(mut self, title: impl Into<String>) -> Self {
        self.dialog_title = title.into();
        self
    }

    /// Current snapshot
    pub fn state(&self) -> RepositoryState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<RepositoryState> {
        self.state.subscribe()
    }

    /// Single entry point for mutating the state
    pub fn dispatch(&self, action: SessionAction) {
        tracing::trace!("Session action: {:?}", action);
        self.state.send_modify(|state| *state = reduce(state, action));
    }

    /// Restore the repository remembered from the previous run.
    ///
    /// Runs at most once per store; later calls return immediately.
    pub async fn restore(&self) {
        if self.restored.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session already restored");
            return;
        }

        let last_path = match self.persistence.get(LAST_REPOSITORY_KEY) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("Failed to read last repository: {}", e);
                self.forget_poisoned_path();
                return;
            }
        };

        let Some(path) = last_path else {
            tracing::info!("No previous repository to restore");
            self.dispatch(SessionAction::RestorationEmpty);
            return;
        };

        tracing::info!("Restoring repository: {}", path);
        if let Err(e) = self.load_repository(&path).await {
            tracing::error!("Failed to load last repository: {}", e);
            self.forget_poisoned_path();
        }
    }

    /// Ask the user for a directory and open it
    pub async fn open_repository(&self) -> Result<LoadOutcome> {
        let request = DirectoryRequest::single(self.dialog_title.clone());

        let selected = match self.gateway.choose_directory(&request).await {
            Ok(selected) => selected,
            Err(e) => {
                tracing::error!("Directory selection failed: {}", e);
                self.dispatch(SessionAction::LoadingError(e.to_string()));
                return Err(e);
            }
        };

        match selected.filter(|path| !path.is_empty()) {
            Some(path) => self.load_repository(&path).await,
            None => {
                tracing::debug!("Directory selection cancelled");
                Ok(LoadOutcome::Cancelled)
            }
        }
    }

    /// Open a known path without the picker
    pub async fn load_repository(&self, path: &str) -> Result<LoadOutcome> {
        self.run_load(path, LoadKind::Open).await
    }

    /// Forget the open repository and the persisted path
    pub fn close_repository(&self) {
        // Any load still in flight must not bring the session back
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = reduce(state, SessionAction::CloseRepository);
        });

        if let Err(e) = self.persistence.remove(LAST_REPOSITORY_KEY) {
            tracing::warn!("Failed to forget last repository: {}", e);
        }
        tracing::info!("Repository closed");
    }

    /// Reload the open repository, keeping the current view on failure.
    ///
    /// A failure leaves `repository` and `error` as they were and is reported
    /// through the dismissible `notice` instead. Skipped while another load is
    /// running, so a background refresh never replaces a repository the user
    /// is opening.
    pub async fn refresh_repository(&self) -> LoadOutcome {
        let mut skipped = LoadOutcome::Cancelled;
        let mut claim = None;

        // Target, busy check and generation are taken under the state lock
        self.state.send_if_modified(|state| {
            let Some(path) = state.repository_path().map(str::to_string) else {
                return false;
            };
            if state.is_loading {
                skipped = LoadOutcome::Superseded;
                return false;
            }
            claim = Some((path, self.claim(state)));
            true
        });

        let Some((path, ticket)) = claim else {
            tracing::debug!("Refresh skipped: {:?}", skipped);
            return skipped;
        };

        match self.finish_load(&path, LoadKind::Refresh, ticket).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Failed to refresh repository {}: {}", path, e);
                LoadOutcome::Failed
            }
        }
    }

    pub fn clear_error(&self) {
        self.dispatch(SessionAction::ClearError);
    }

    pub fn dismiss_notice(&self) {
        self.dispatch(SessionAction::DismissNotice);
    }

    /// Re-read the branch list of the open repository
    pub async fn sync_branches(&self) -> Result<LoadOutcome> {
        let Some((path, generation)) = self.current_target()? else {
            return Ok(LoadOutcome::Superseded);
        };
        let branches: Vec<Branch> = self.gateway.list_branches(&path).await?;

        if !self.still_current(&path, generation) {
            return Ok(LoadOutcome::Superseded);
        }
        self.dispatch(SessionAction::UpdateBranches(branches));
        Ok(LoadOutcome::Applied)
    }

    /// Re-read the index of the open repository
    pub async fn sync_index(&self) -> Result<LoadOutcome> {
        let Some((path, generation)) = self.current_target()? else {
            return Ok(LoadOutcome::Superseded);
        };
        let index = self.gateway.read_index(&path).await?;

        if !self.still_current(&path, generation) {
            return Ok(LoadOutcome::Superseded);
        }
        self.dispatch(SessionAction::UpdateIndex(index));
        Ok(LoadOutcome::Applied)
    }

    async fn run_load(&self, path: &str, kind: LoadKind) -> Result<LoadOutcome> {
        let mut ticket = LoadTicket::default();
        self.state.send_modify(|state| ticket = self.claim(state));
        self.finish_load(path, kind, ticket).await
    }

    /// Take a new generation and enter loading; runs inside the state lock
    fn claim(&self, state: &mut RepositoryState) -> LoadTicket {
        let ticket = LoadTicket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            previous_error: state.error.clone(),
        };
        tracing::trace!("Load {} started", ticket.generation);
        *state = reduce(state, SessionAction::LoadingStart);
        ticket
    }

    async fn finish_load(&self, path: &str, kind: LoadKind, ticket: LoadTicket) -> Result<LoadOutcome> {
        let result = self.gateway.open_repository(path).await;

        let (action, outcome) = match result {
            Ok(repository) => (SessionAction::LoadingSuccess(repository), Ok(LoadOutcome::Applied)),
            Err(e) => {
                let message = e.to_string();
                let action = match kind {
                    LoadKind::Open => SessionAction::LoadingError(message),
                    LoadKind::Refresh => SessionAction::RefreshFailed {
                        notice: format!("Refresh failed: {}", message),
                        previous_error: ticket.previous_error,
                    },
                };
                (action, Err(e))
            }
        };

        // Apply only if no newer load or close started meanwhile
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.generation {
                return false;
            }
            *state = reduce(state, action);
            true
        });

        if !applied {
            tracing::debug!("Discarding superseded load of {}", path);
            return Ok(LoadOutcome::Superseded);
        }

        if outcome.is_ok() {
            tracing::info!("Opened repository: {}", path);
            if let Err(e) = self.persistence.set(LAST_REPOSITORY_KEY, path) {
                tracing::warn!("Failed to remember repository {}: {}", path, e);
            }
        }
        outcome
    }

    fn forget_poisoned_path(&self) {
        if let Err(e) = self.persistence.remove(LAST_REPOSITORY_KEY) {
            tracing::warn!("Failed to forget last repository: {}", e);
        }
        self.dispatch(SessionAction::LoadingError(RESTORE_FAILED_MESSAGE.to_string()));
    }

    /// Path and generation a sync runs against; `None` while a load is running
    fn current_target(&self) -> Result<Option<(String, u64)>> {
        let generation = self.generation.load(Ordering::SeqCst);
        let state = self.state();
        let path = state
            .repository_path()
            .map(str::to_string)
            .ok_or(FluxError::RepositoryNotOpen)?;
        if state.is_loading {
            return Ok(None);
        }
        Ok(Some((path, generation)))
    }

    fn still_current(&self, path: &str, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
            && self.state().repository_path() == Some(path)
    }
}
