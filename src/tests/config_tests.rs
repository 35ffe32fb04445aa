// Config tests - defaults and JSON persistence

use crate::config::ClientConfig;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = ClientConfig::default();
    assert_eq!(config.server_addr, "127.0.0.1:4000");
    assert_eq!(config.request_timeout_ms, 10_000);
}

#[test]
fn test_config_save_and_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("chatsync.json");

    let config = ClientConfig {
        server_addr: "chat.example.com:8080".to_string(),
        request_timeout_ms: 2_500,
    };
    config.save(&path).expect("Failed to save config");

    let loaded = ClientConfig::load(&path).expect("Failed to load config");
    assert_eq!(loaded, config);
}

#[test]
fn test_config_load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("does_not_exist.json");

    let loaded = ClientConfig::load(&path).expect("Failed to load config");
    assert_eq!(loaded, ClientConfig::default());
}

#[test]
fn test_config_load_empty_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("empty.json");
    std::fs::write(&path, "  \n").expect("Failed to write file");

    let loaded = ClientConfig::load(&path).expect("Failed to load config");
    assert_eq!(loaded, ClientConfig::default());
}

#[test]
fn test_config_save_creates_parent_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested/dir/chatsync.json");

    ClientConfig::default().save(&path).expect("Failed to save config");
    assert!(path.exists());
}
