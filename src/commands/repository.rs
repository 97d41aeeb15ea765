//! Repository command handlers

use tauri::{command, State};

use crate::error::Result;
use crate::models::Repository;
use crate::services::{BackendGateway, GitGateway};

/// Load a repository snapshot without touching the session
#[command]
pub async fn open_repository(gateway: State<'_, GitGateway>, path: String) -> Result<Repository> {
    gateway.open_repository(&path).await
}
