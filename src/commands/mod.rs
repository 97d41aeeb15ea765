//! Tauri command handlers

pub mod repository;
pub mod session;
