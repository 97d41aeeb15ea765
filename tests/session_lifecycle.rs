//! End-to-end session lifecycle against real repositories on disk
//!
//! Wires the session store the way the app does (git2 gateway plus a JSON
//! file store) and walks it through cold start, restart and close.

use std::path::Path;
use std::sync::Arc;

use flux_desktop_lib::models::SessionPhase;
use flux_desktop_lib::services::session_store::RESTORE_FAILED_MESSAGE;
use flux_desktop_lib::services::{
    GitGateway, GitService, JsonFileStore, LoadOutcome, PersistenceAdapter, PresetChooser,
    RootView, RootViewController, SessionStore, LAST_REPOSITORY_KEY,
};
use git2::{Repository, Signature};
use tempfile::TempDir;

/// Create a repository with one commit on `main` and the given extra branches
fn setup_repo(branches: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let repo = Repository::init(dir.path()).expect("Failed to init repo");
    repo.set_head("refs/heads/main").expect("Failed to set HEAD");

    std::fs::write(dir.path().join("README.md"), "# flux\n").expect("Failed to write file");
    let mut index = repo.index().expect("Failed to get index");
    index
        .add_path(Path::new("README.md"))
        .expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");

    let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .expect("Failed to commit");
    let commit = repo.find_commit(oid).expect("Failed to find commit");

    for name in branches {
        repo.branch(name, &commit, false)
            .expect("Failed to create branch");
    }
    dir
}

fn path_of(dir: &TempDir) -> String {
    dir.path().to_string_lossy().to_string()
}

/// A store as the app builds it, reading the session file at `session_file`
fn app_store(session_file: &Path, chooser: PresetChooser) -> Arc<SessionStore> {
    let gateway = GitGateway::new(GitService::default(), Arc::new(chooser));
    let persistence = Arc::new(JsonFileStore::new(session_file));
    Arc::new(SessionStore::new(Arc::new(gateway), persistence))
}

#[tokio::test]
async fn test_cold_start_open_and_restart() {
    let repo = setup_repo(&["feature"]);
    let config_dir = TempDir::new().unwrap();
    let session_file = config_dir.path().join("session.json");

    // First launch: nothing remembered
    let store = app_store(&session_file, PresetChooser::with_selection(path_of(&repo)));
    store.restore().await;
    let state = store.state();
    assert_eq!(state.phase(), SessionPhase::AwaitingSelection);
    assert!(state.error.is_none());

    let outcome = store.open_repository().await.unwrap();
    assert_eq!(outcome, LoadOutcome::Applied);
    let state = store.state();
    assert_eq!(state.phase(), SessionPhase::Loaded);
    assert_eq!(state.repository_path(), Some(path_of(&repo).as_str()));
    assert_eq!(state.branches().map(|b| b.len()), Some(2));

    // Second launch restores the same repository without a dialog
    let restarted = app_store(&session_file, PresetChooser::new());
    restarted.restore().await;
    let state = restarted.state();
    assert_eq!(state.phase(), SessionPhase::Loaded);
    assert_eq!(state.repository_path(), Some(path_of(&repo).as_str()));
}

#[tokio::test]
async fn test_restart_after_repository_was_deleted() {
    let config_dir = TempDir::new().unwrap();
    let session_file = config_dir.path().join("session.json");
    let missing = config_dir.path().join("gone").to_string_lossy().to_string();
    JsonFileStore::new(&session_file)
        .set(LAST_REPOSITORY_KEY, &missing)
        .unwrap();

    let store = app_store(&session_file, PresetChooser::new());
    store.restore().await;

    let state = store.state();
    assert!(state.repository.is_none());
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some(RESTORE_FAILED_MESSAGE));
    // The stale path is forgotten so the next launch starts clean
    assert_eq!(
        JsonFileStore::new(&session_file)
            .get(LAST_REPOSITORY_KEY)
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_corrupt_session_file_recovers_on_next_open() {
    let repo = setup_repo(&[]);
    let config_dir = TempDir::new().unwrap();
    let session_file = config_dir.path().join("session.json");
    std::fs::write(&session_file, "{ truncated").unwrap();

    let store = app_store(&session_file, PresetChooser::new());
    store.restore().await;
    assert_eq!(store.state().error.as_deref(), Some(RESTORE_FAILED_MESSAGE));

    let outcome = store.load_repository(&path_of(&repo)).await.unwrap();
    assert_eq!(outcome, LoadOutcome::Applied);

    let restarted = app_store(&session_file, PresetChooser::new());
    restarted.restore().await;
    let state = restarted.state();
    assert_eq!(state.phase(), SessionPhase::Loaded);
    assert!(state.error.is_none());
    assert_eq!(state.repository_path(), Some(path_of(&repo).as_str()));
}

#[tokio::test]
async fn test_close_forgets_repository_across_restarts() {
    let repo = setup_repo(&[]);
    let config_dir = TempDir::new().unwrap();
    let session_file = config_dir.path().join("session.json");

    let store = app_store(&session_file, PresetChooser::new());
    store.load_repository(&path_of(&repo)).await.unwrap();
    store.close_repository();
    assert!(store.state().repository.is_none());

    let restarted = app_store(&session_file, PresetChooser::new());
    restarted.restore().await;
    assert_eq!(restarted.state().phase(), SessionPhase::AwaitingSelection);
}

#[tokio::test]
async fn test_cancelled_dialog_keeps_prompt() {
    let config_dir = TempDir::new().unwrap();
    let store = app_store(&config_dir.path().join("session.json"), PresetChooser::new());
    store.restore().await;

    let outcome = store.open_repository().await.unwrap();
    assert_eq!(outcome, LoadOutcome::Cancelled);
    assert!(store.state().repository.is_none());
    assert!(!store.state().is_loading);
}

#[tokio::test]
async fn test_root_view_follows_session() {
    let repo = setup_repo(&["develop"]);
    let config_dir = TempDir::new().unwrap();
    let store = app_store(&config_dir.path().join("session.json"), PresetChooser::new());
    let view = RootViewController::new(Arc::clone(&store));

    assert!(matches!(view.render(), RootView::OpenPrompt { is_loading: true, .. }));
    store.restore().await;
    assert!(matches!(view.render(), RootView::OpenPrompt { is_loading: false, error: None }));

    store.load_repository(&path_of(&repo)).await.unwrap();
    let RootView::Workspace {
        repository_path,
        menu,
        ..
    } = view.render()
    else {
        panic!("expected workspace view");
    };
    assert_eq!(repository_path, path_of(&repo));

    let branches = menu
        .iter()
        .find(|node| node.id == "branches")
        .expect("branches folder");
    let labels: Vec<&str> = branches.children.iter().map(|n| n.label.as_str()).collect();
    assert!(labels.contains(&"main"));
    assert!(labels.contains(&"develop"));
    let current: Vec<&str> = branches
        .children
        .iter()
        .filter(|n| n.class_name.as_deref() == Some("current-branch"))
        .map(|n| n.label.as_str())
        .collect();
    assert_eq!(current, vec!["main"]);

    // Collapsing the workspace hides its children
    let RootView::Workspace { menu, .. } = view.toggle("workspace") else {
        panic!("expected workspace view");
    };
    assert!(menu[0].children.is_empty());

    store.close_repository();
    assert!(matches!(view.render(), RootView::OpenPrompt { .. }));
}
