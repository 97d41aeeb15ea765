//! flux - repository session shell
//!
//! Tracks which repository is open in the flux desktop app, remembers it
//! across restarts and derives the navigation menu from it. The Tauri
//! surface is behind the `desktop` feature.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use services::{DirectoryChooser, GitGateway, GitService, JsonFileStore, SessionStore};

/// Install the global tracing subscriber
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flux_desktop_lib=debug,git2=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wire a session store from configuration and a directory chooser
pub fn build_session(config: &AppConfig, chooser: Arc<dyn DirectoryChooser>) -> (GitGateway, SessionStore) {
    let gateway = GitGateway::new(GitService::new(config.commit_history_limit), chooser);
    let persistence = Arc::new(JsonFileStore::new(config.session_file.clone()));
    let store = SessionStore::new(Arc::new(gateway.clone()), persistence)
        .with_dialog_title(config.dialog_title.clone());
    (gateway, store)
}

/// Initialize the application
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::time::Duration;
    use tauri::Manager;

    use services::dialog::TauriDirectoryChooser;
    use services::RootViewController;

    init_tracing();
    tracing::info!("Starting flux");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Invalid configuration, using defaults: {}", e);
            AppConfig::default()
        }
    };

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(move |app| {
            let chooser = Arc::new(TauriDirectoryChooser::new(app.handle().clone()));
            let (gateway, store) = build_session(&config, chooser);
            let store = Arc::new(store);

            commands::session::forward_session_events(app.handle().clone(), Arc::clone(&store));

            let restoring = Arc::clone(&store);
            let watch_enabled = config.watch_enabled;
            let debounce = Duration::from_millis(config.watch_debounce_ms);
            tauri::async_runtime::spawn(async move {
                restoring.restore().await;
                if watch_enabled {
                    services::watcher_service::follow_session(restoring, debounce).await;
                }
            });

            app.manage(gateway);
            app.manage(RootViewController::new(store));

            tracing::info!("Application setup complete");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::repository::open_repository,
            commands::session::get_session_state,
            commands::session::get_root_view,
            commands::session::open_repository_dialog,
            commands::session::close_repository,
            commands::session::refresh_repository,
            commands::session::clear_error,
            commands::session::dismiss_notice,
            commands::session::toggle_menu_item,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Error while running flux: {}", e);
    }
}
