//! Integration tests for configuration loading through the environment.

use std::env;
use std::sync::Mutex;

use notepush::Config;
use tempfile::TempDir;

// Global lock to prevent env var pollution between tests
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = ENV_LOCK.lock().unwrap();
    let temp_dir = TempDir::new().unwrap();

    env::remove_var("NOTEPUSH_NOTES_URL");
    env::remove_var("NOTEPUSH_PROJECT_ID");
    env::remove_var("NOTEPUSH_REQUEST_TIMEOUT");
    env::set_var("NOTEPUSH_CONFIG_DIR", temp_dir.path());

    (temp_dir, guard)
}

#[test]
fn test_load_without_file_uses_defaults() {
    let (_dir, _guard) = setup_test_env();

    let config = Config::load().unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.notes_url, "https://push-utq8.onrender.com");
}

#[test]
fn test_saved_config_is_loaded_back() {
    let (dir, _guard) = setup_test_env();

    let config = Config {
        project_id: Some("notes-app".to_string()),
        request_timeout_secs: 3,
        ..Config::default()
    };
    config.save().unwrap();
    assert!(dir.path().join("config.json").exists());

    assert_eq!(Config::load().unwrap(), config);
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, _guard) = setup_test_env();
    Config {
        notes_url: "http://file.example".to_string(),
        ..Config::default()
    }
    .save()
    .unwrap();

    env::set_var("NOTEPUSH_NOTES_URL", "http://env.example");
    env::set_var("NOTEPUSH_PROJECT_ID", "from-env");
    let config = Config::load().unwrap();
    env::remove_var("NOTEPUSH_NOTES_URL");
    env::remove_var("NOTEPUSH_PROJECT_ID");

    assert_eq!(config.notes_url, "http://env.example");
    assert_eq!(config.project_id.as_deref(), Some("from-env"));
}
