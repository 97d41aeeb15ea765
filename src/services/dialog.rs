//! Native directory picker backed by the Tauri dialog plugin

use async_trait::async_trait;
use tauri::AppHandle;
use tauri_plugin_dialog::DialogExt;

use crate::error::{FluxError, Result};
use crate::services::gateway::{DirectoryChooser, DirectoryRequest};

pub struct TauriDirectoryChooser {
    app: AppHandle,
}

impl TauriDirectoryChooser {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

#[async_trait]
impl DirectoryChooser for TauriDirectoryChooser {
    async fn choose(&self, request: &DirectoryRequest) -> Result<Option<String>> {
        let app = self.app.clone();
        let title = request.title.clone();

        // The blocking picker must stay off the async runtime threads
        let picked = tokio::task::spawn_blocking(move || {
            app.dialog().file().set_title(title).blocking_pick_folder()
        })
        .await
        .map_err(|e| FluxError::Dialog(format!("Picker task failed: {}", e)))?;

        picked
            .map(|folder| {
                folder
                    .into_path()
                    .map(|p| p.to_string_lossy().to_string())
                    .map_err(|e| FluxError::Dialog(format!("Unsupported selection: {}", e)))
            })
            .transpose()
    }
}
