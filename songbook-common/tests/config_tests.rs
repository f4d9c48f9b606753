//! Configuration resolution tests
//!
//! Tests that manipulate SONGBOOK_* environment variables are marked
//! #[serial] so they never run in parallel with each other.

use serial_test::serial;
use songbook_common::config::{
    load_toml_config, resolve_config_path, BuildStep, Config, ConfigOverrides, TomlConfig,
    ENV_BASE_DIR, ENV_CONFIG, ENV_HOST, ENV_PORT,
};
use std::env;
use std::path::PathBuf;

fn clear_env() {
    for name in [ENV_BASE_DIR, ENV_HOST, ENV_PORT, ENV_CONFIG] {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();

    let config = Config::resolve(TomlConfig::default(), ConfigOverrides::default()).unwrap();

    assert_eq!(config.base_dir, PathBuf::from("."));
    assert_eq!(config.songs_dir, PathBuf::from("./songs"));
    assert_eq!(config.flags_file, PathBuf::from("./flagged.json"));
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8000);
    assert_eq!(config.log_level, "info");
    assert!(config.build.enabled);
    assert_eq!(
        config.build.steps,
        vec![BuildStep::Command {
            program: "npm".to_string(),
            args: vec!["run".to_string(), "build:songs".to_string()],
        }]
    );
}

#[test]
#[serial]
fn test_toml_values_apply() {
    clear_env();

    let toml_config: TomlConfig = toml::from_str(
        r#"
        base_dir = "/srv/songbook"
        songs_dir = "charts"
        flags_file = "/var/lib/songbook/flags.json"
        port = 9000

        [logging]
        level = "debug"

        [build]
        enabled = false

        [[build.steps]]
        kind = "index"
        output_dir = "public/data"

        [[build.steps]]
        kind = "command"
        program = "./deploy.sh"
        "#,
    )
    .unwrap();

    let config = Config::resolve(toml_config, ConfigOverrides::default()).unwrap();

    assert_eq!(config.songs_dir, PathBuf::from("/srv/songbook/charts"));
    assert_eq!(config.flags_file, PathBuf::from("/var/lib/songbook/flags.json"));
    assert_eq!(config.port, 9000);
    assert_eq!(config.log_level, "debug");
    assert!(!config.build.enabled);
    assert_eq!(
        config.build.steps,
        vec![
            BuildStep::Index {
                output_dir: PathBuf::from("public/data"),
            },
            BuildStep::Command {
                program: "./deploy.sh".to_string(),
                args: Vec::new(),
            },
        ]
    );
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_BASE_DIR, "/tmp/songbook-env");
    env::set_var(ENV_PORT, "7001");

    let toml_config = TomlConfig {
        base_dir: Some(PathBuf::from("/srv/from-toml")),
        port: Some(9000),
        ..TomlConfig::default()
    };
    let config = Config::resolve(toml_config, ConfigOverrides::default()).unwrap();

    assert_eq!(config.base_dir, PathBuf::from("/tmp/songbook-env"));
    assert_eq!(config.port, 7001);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_HOST, "10.0.0.1");

    let overrides = ConfigOverrides {
        host: Some("127.0.0.1".to_string()),
        port: Some(5000),
        ..ConfigOverrides::default()
    };
    let config = Config::resolve(TomlConfig::default(), overrides).unwrap();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 5000);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_port_is_error() {
    clear_env();
    env::set_var(ENV_PORT, "not-a-port");

    let result = Config::resolve(TomlConfig::default(), ConfigOverrides::default());
    assert!(result.is_err());

    clear_env();
}

#[test]
#[serial]
fn test_config_path_priority() {
    clear_env();
    env::set_var(ENV_CONFIG, "/etc/songbook-env.toml");

    let cli = PathBuf::from("/tmp/cli.toml");
    assert_eq!(resolve_config_path(Some(&cli)), Some(cli.clone()));
    assert_eq!(resolve_config_path(None), Some(PathBuf::from("/etc/songbook-env.toml")));

    clear_env();
}

#[test]
fn test_missing_toml_file_is_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_malformed_toml_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"eighty\"").unwrap();

    assert!(load_toml_config(&path).is_err());
}
