use chat_widget::backend::BackendSettings;
use chat_widget::config::{AppConfig, DEFAULT_BACKEND_URL};
use serial_test::serial;
use std::env;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("WIDGET_SERVER__PORT");
        env::remove_var("WIDGET_BACKEND__BASE_URL");
        env::remove_var("WIDGET_WIDGET__TITLE");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("BACKEND_URL");
        env::remove_var("WIDGET_TITLE");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["chat-widget"]).expect("defaults should load");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
    assert_eq!(config.widget.title, "Assistant");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("WIDGET_SERVER__PORT", "9090");
        env::set_var("WIDGET_BACKEND__BASE_URL", "http://backend:9000");
    }

    let config = AppConfig::load_from_args(["chat-widget"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.backend.base_url, "http://backend:9000");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env_vars();
    unsafe {
        env::set_var("WIDGET_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args(["chat-widget", "--port", "8080"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 8080);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("widget.yaml");
    std::fs::write(&path, "server:\n  port: 7070\nwidget:\n  title: Support\n")
        .expect("Failed to write temp config");

    let config = AppConfig::load_from_args(["chat-widget", "--config", path.to_str().unwrap()])
        .expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.widget.title, "Support");

    // Untouched sections keep their defaults.
    assert_eq!(config.backend.base_url, DEFAULT_BACKEND_URL);
}

#[test]
#[serial]
fn test_trailing_slash_normalized_before_use() {
    clear_env_vars();

    let config =
        AppConfig::load_from_args(["chat-widget", "--backend-url", "http://backend:9000/"])
            .expect("Failed to load config");

    // The raw value keeps whatever the operator typed; normalization happens
    // where the URL is put to use.
    assert_eq!(config.backend.base_url, "http://backend:9000/");

    let settings = BackendSettings::new(&config.backend.base_url);
    assert_eq!(settings.base_url(), "http://backend:9000");
    assert_eq!(settings.chat_url(), "http://backend:9000/api/chat");
}
