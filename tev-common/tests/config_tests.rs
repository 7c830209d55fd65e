//! Tests for configuration loading and root folder resolution
//!
//! Tests that touch TEV_ROOT_FOLDER are marked #[serial] so they do not race
//! on the process environment.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tev_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.ends_with("tev") || defaults.root_folder.ends_with("tev_data"));
    assert_eq!(defaults.port, 8080);
    assert_eq!(defaults.bind_address, "127.0.0.1");
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new().with_config(None);
    let root_folder = resolver.resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/tev-test-env-folder");

    let resolver = RootFolderResolver::new().with_config(None);
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/tev-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_arg_beats_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/tev-priority-2");

    let resolver = RootFolderResolver::new()
        .with_config(None)
        .with_cli_arg(Some(PathBuf::from("/tmp/tev-priority-1")));
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/tev-priority-1"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_config_file_beats_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig::parse("root_folder = \"/srv/tev\"").unwrap();
    let resolver = RootFolderResolver::new().with_config(Some(config));

    assert_eq!(resolver.resolve(), PathBuf::from("/srv/tev"));
}

#[test]
fn test_toml_config_optional_keys() {
    let config = TomlConfig::parse(
        r#"
        port = 9090
        log_level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.port, Some(9090));
    assert_eq!(config.log_level.as_deref(), Some("debug"));
    assert!(config.root_folder.is_none());
    assert!(config.bind_address.is_none());

    assert_eq!(TomlConfig::parse("").unwrap(), TomlConfig::default());
}

#[test]
fn test_toml_config_rejects_bad_types() {
    assert!(TomlConfig::parse("port = \"eighty\"").is_err());
}

#[test]
fn test_toml_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "bind_address = \"0.0.0.0\"\n").unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));

    assert!(TomlConfig::load(&dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_initializer_database_path() {
    let root = PathBuf::from("/tmp/tev-test-root");
    let initializer = RootFolderInitializer::new(root.clone());

    assert_eq!(initializer.database_path(), root.join("tev.db"));
    assert!(!initializer.database_exists());
}

#[test]
fn test_initializer_idempotent_directory_creation() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("tev");

    let initializer = RootFolderInitializer::new(root.clone());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(initializer.ensure_directory_exists().is_ok());

    assert!(root.is_dir());
}
