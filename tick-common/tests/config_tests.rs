//! Tests for configuration loading and root folder resolution
//!
//! Tests that touch `TICK_ROOT_FOLDER` are marked `#[serial]` so they never
//! run in parallel with each other.

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tick_common::config::{
    database_path, default_root_folder, resolve_in_root, resolve_root_folder, TomlConfig,
    DEFAULT_FEED_TIMEOUT_SECS, DEFAULT_FEED_URL, ROOT_FOLDER_ENV,
};

#[test]
fn test_empty_toml_uses_defaults() {
    let config = TomlConfig::parse("").unwrap();

    assert!(config.root_folder.is_none());
    assert!(config.port.is_none());
    assert_eq!(config.feed.url, DEFAULT_FEED_URL);
    assert_eq!(config.feed.timeout_secs, DEFAULT_FEED_TIMEOUT_SECS);
    assert!(config.feed.enabled);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.city_table().len(), 14);
}

#[test]
fn test_full_toml_parses() {
    let config = TomlConfig::parse(
        r#"
        root_folder = "/srv/ticks"
        port = 9000
        host = "0.0.0.0"
        seed_file = "seed.json"

        [feed]
        url = "http://localhost:1234/feed"
        timeout_secs = 2
        enabled = false

        [logging]
        level = "debug"

        [[cities]]
        name = "York"
        lat = 53.96
        lng = -1.08
        "#,
    )
    .unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/ticks")));
    assert_eq!(config.port, Some(9000));
    assert_eq!(config.feed.timeout_secs, 2);
    assert!(!config.feed.enabled);
    assert_eq!(config.logging.level, "debug");

    let cities = config.city_table();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities.coordinates("york"), Some((53.96, -1.08)));
    assert_eq!(cities.coordinates("London"), None);
}

#[test]
fn test_invalid_toml_is_rejected() {
    assert!(TomlConfig::parse("port = \"not a number\"").is_err());
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = TomlConfig::load_or_default(Some(&missing));
    assert!(matches!(result, Err(tick_common::Error::Config(_))));
}

#[test]
fn test_explicit_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 8100\n").unwrap();

    let config = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.port, Some(8100));
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/from-cli")), &toml);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/tmp/from-cli"));
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, &toml);
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/tmp/from-env"));
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };
    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/tmp/from-toml"));

    let root = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(root, default_root_folder());
}

#[test]
fn test_paths_resolve_against_root() {
    let root = Path::new("/data/ticks");

    assert_eq!(database_path(root), PathBuf::from("/data/ticks/tick_tracker.db"));
    assert_eq!(
        resolve_in_root(root, Path::new("uploads")),
        PathBuf::from("/data/ticks/uploads")
    );
    assert_eq!(
        resolve_in_root(root, Path::new("/elsewhere/seed.json")),
        PathBuf::from("/elsewhere/seed.json")
    );
}
