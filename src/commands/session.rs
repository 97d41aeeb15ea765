//! Session command handlers
//!
//! Thin wrappers over [`RootViewController`]; every mutating command returns
//! the view the frontend should render next.

use std::sync::Arc;

use tauri::{command, AppHandle, Emitter, State};

use crate::error::Result;
use crate::models::RepositoryState;
use crate::services::{RootView, RootViewController, SessionStore};

/// Event carrying the new [`RepositoryState`] after every transition
pub const SESSION_CHANGED_EVENT: &str = "session-changed";

#[command]
pub async fn get_session_state(view: State<'_, RootViewController>) -> Result<RepositoryState> {
    Ok(view.store().state())
}

#[command]
pub async fn get_root_view(view: State<'_, RootViewController>) -> Result<RootView> {
    Ok(view.render())
}

/// Show the directory picker and open the selection
#[command]
pub async fn open_repository_dialog(view: State<'_, RootViewController>) -> Result<RootView> {
    view.store().open_repository().await?;
    Ok(view.render())
}

#[command]
pub async fn close_repository(view: State<'_, RootViewController>) -> Result<RootView> {
    view.store().close_repository();
    Ok(view.render())
}

#[command]
pub async fn refresh_repository(view: State<'_, RootViewController>) -> Result<RootView> {
    view.store().refresh_repository().await;
    Ok(view.render())
}

#[command]
pub async fn clear_error(view: State<'_, RootViewController>) -> Result<RootView> {
    view.store().clear_error();
    Ok(view.render())
}

#[command]
pub async fn dismiss_notice(view: State<'_, RootViewController>) -> Result<RootView> {
    view.store().dismiss_notice();
    Ok(view.render())
}

#[command]
pub async fn toggle_menu_item(view: State<'_, RootViewController>, id: String) -> Result<RootView> {
    Ok(view.toggle(&id))
}

/// Forward every session transition to the frontend
pub fn forward_session_events(app: AppHandle, store: Arc<SessionStore>) {
    let mut states = store.subscribe();
    tauri::async_runtime::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if let Err(e) = app.emit(SESSION_CHANGED_EVENT, state) {
                tracing::warn!("Failed to emit session state: {}", e);
            }
        }
    });
}
