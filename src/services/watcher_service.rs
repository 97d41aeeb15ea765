//! File system watcher keeping the session in step with the open repository

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{FluxError, Result};
use crate::services::session_store::SessionStore;

/// Events emitted by the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEvent {
    /// Files in the working directory changed
    WorkdirChanged(Vec<PathBuf>),
    /// The git index changed
    IndexChanged,
    /// HEAD moved (checkout, detach)
    HeadChanged,
    /// Branch references changed
    RefsChanged,
    /// Configuration changed
    ConfigChanged,
}

/// What a batch of events requires from the session store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub refresh: bool,
    pub branches: bool,
    pub index: bool,
}

impl SyncPlan {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a WatcherEvent>) -> Self {
        let mut plan = SyncPlan::default();
        for event in events {
            match event {
                WatcherEvent::WorkdirChanged(_) | WatcherEvent::HeadChanged => plan.refresh = true,
                WatcherEvent::RefsChanged => plan.branches = true,
                WatcherEvent::IndexChanged => plan.index = true,
                WatcherEvent::ConfigChanged => {}
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        !(self.refresh || self.branches || self.index)
    }

    /// Run the plan; a full refresh covers the partial updates
    pub async fn apply(self, store: &SessionStore) {
        if self.refresh {
            store.refresh_repository().await;
            return;
        }

        if self.branches {
            if let Err(e) = store.sync_branches().await {
                tracing::warn!("Failed to sync branches: {}", e);
            }
        }

        if self.index {
            if let Err(e) = store.sync_index().await {
                tracing::warn!("Failed to sync index: {}", e);
            }
        }
    }
}

/// Recursive watch over one repository directory
pub struct RepositoryWatcher {
    watcher: RecommendedWatcher,
    path: PathBuf,
}

impl RepositoryWatcher {
    /// Start watching `repo_path`, sending classified events to `tx`
    pub fn start(repo_path: &Path, tx: mpsc::UnboundedSender<WatcherEvent>) -> Result<Self> {
        let config = Config::default().with_poll_interval(Duration::from_secs(1));

        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if let Some(watcher_event) = classify_event(&event) {
                        let _ = tx.send(watcher_event);
                    }
                }
                Err(e) => tracing::warn!("Watch error: {}", e),
            },
            config,
        )
        .map_err(|e| FluxError::OperationFailed(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(repo_path, RecursiveMode::Recursive)
            .map_err(|e| FluxError::OperationFailed(format!("Failed to watch: {}", e)))?;

        tracing::debug!("Watching {}", repo_path.display());
        Ok(Self {
            watcher,
            path: repo_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepositoryWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.watcher.unwatch(&self.path) {
            tracing::debug!("Failed to unwatch {}: {}", self.path.display(), e);
        }
    }
}

/// Classify a notify event into our event types
pub fn classify_event(event: &Event) -> Option<WatcherEvent> {
    // Our own reads must not trigger another reload
    if event.paths.is_empty() || matches!(event.kind, EventKind::Access(_)) {
        return None;
    }

    let (git_paths, workdir_paths): (Vec<&PathBuf>, Vec<&PathBuf>) = event
        .paths
        .iter()
        .partition(|p| p.components().any(|c| c.as_os_str() == ".git"));

    for path in &git_paths {
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());
        let path_str = path.to_string_lossy();

        if file_name.as_deref() == Some("index") {
            return Some(WatcherEvent::IndexChanged);
        }

        if file_name.as_deref() == Some("HEAD") && !path_str.contains("logs") {
            return Some(WatcherEvent::HeadChanged);
        }

        if path_str.contains("refs") || file_name.as_deref() == Some("packed-refs") {
            return Some(WatcherEvent::RefsChanged);
        }

        if file_name.as_deref() == Some("config") {
            return Some(WatcherEvent::ConfigChanged);
        }
    }

    if !workdir_paths.is_empty() {
        return Some(WatcherEvent::WorkdirChanged(
            workdir_paths.into_iter().cloned().collect(),
        ));
    }

    None
}

/// Keeps at most one [`RepositoryWatcher`], pointed at the open repository
pub struct SessionFollower {
    tx: mpsc::UnboundedSender<WatcherEvent>,
    current: Option<RepositoryWatcher>,
}

impl SessionFollower {
    pub fn new(tx: mpsc::UnboundedSender<WatcherEvent>) -> Self {
        Self { tx, current: None }
    }

    /// Directory currently watched
    pub fn watched(&self) -> Option<&Path> {
        self.current.as_ref().map(|w| w.path())
    }

    /// Watch `wanted`, replacing or dropping the previous watcher as needed
    pub fn retarget(&mut self, wanted: Option<&Path>) {
        if self.watched() == wanted {
            return;
        }

        self.current = None;
        if let Some(path) = wanted {
            match RepositoryWatcher::start(path, self.tx.clone()) {
                Ok(watcher) => self.current = Some(watcher),
                Err(e) => tracing::warn!("Failed to watch {}: {}", path.display(), e),
            }
        }
    }
}

/// Follow the session: watch whichever repository is open and push changes
/// back into the store. Runs until the store's state channel closes.
pub async fn follow_session(store: Arc<SessionStore>, debounce: Duration) {
    let mut states = store.subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut follower = SessionFollower::new(tx);

    loop {
        let wanted = states.borrow_and_update().repository_path().map(PathBuf::from);
        follower.retarget(wanted.as_deref());

        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            Some(first) = rx.recv() => {
                tokio::time::sleep(debounce).await;
                let mut batch = vec![first];
                while let Ok(event) = rx.try_recv() {
                    batch.push(event);
                }

                let plan = SyncPlan::from_events(&batch);
                if !plan.is_empty() {
                    tracing::debug!("Repository changed on disk: {:?}", plan);
                    plan.apply(&store).await;
                }
            }
        }
    }
}
