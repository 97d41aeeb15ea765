//! Service layer for flux
//!
//! The session store and everything it is built from: storage, the backend
//! gateway, navigation derivation and the file watcher.

#[cfg(feature = "desktop")]
pub mod dialog;
pub mod gateway;
pub mod git_service;
pub mod navigation;
pub mod persistence;
pub mod root_view;
pub mod session_store;
pub mod watcher_service;

pub use gateway::{BackendGateway, DirectoryChooser, DirectoryRequest, GitGateway, PresetChooser};
pub use git_service::GitService;
pub use navigation::ExpandState;
pub use persistence::{JsonFileStore, MemoryStore, PersistenceAdapter, LAST_REPOSITORY_KEY};
pub use root_view::{RootView, RootViewController};
pub use session_store::{LoadOutcome, SessionStore};
pub use watcher_service::{SessionFollower, WatcherEvent};
