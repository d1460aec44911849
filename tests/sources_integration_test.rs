//! Integration tests for the standard source chain
//!
//! Files are written to temporary directories; environment-driven sources
//! use injected variables except where the process environment itself is
//! under test.

use conflux::config::SourcesConfig;
use conflux::domain::DiagnosticLevel;
use conflux::resolution::ConfigurationResolver;
use conflux::sources::{
    default_chain, CliArgumentsSource, EnvironmentScheme, EnvironmentSource, LegacyIniSource,
    PermissionPolicy, TomlFileSource, ValueSource,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const LEGACY_CONFIG: &str = r#"
[connections]
accountname = legacy_acct
username = legacy_user
pwd = legacy_pw

[connections.prod]
accountname = prod_acct
rolename = prod_role

[variables]
env = test

[options]
log_level = debug
"#;

const CONFIG_TOML: &str = r#"
default_connection_name = "prod"

[connections.prod]
account = "toml_prod"

[cli.logs]
level = "info"
"#;

const CONNECTIONS_TOML: &str = r#"
[dev]
account = "dev_acct"
port = 443
"#;

fn write_private(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
    }
    path
}

fn file_chain(dir: &TempDir) -> ConfigurationResolver {
    let legacy = write_private(dir.path(), "config", LEGACY_CONFIG);
    let config_toml = write_private(dir.path(), "config.toml", CONFIG_TOML);
    let connections_toml = write_private(dir.path(), "connections.toml", CONNECTIONS_TOML);

    ConfigurationResolver::builder()
        .source(LegacyIniSource::new(legacy))
        .source(TomlFileSource::cli_config(config_toml))
        .source(TomlFileSource::connections(connections_toml))
        .source(EnvironmentSource::with_vars(
            EnvironmentScheme::ConnectionScoped,
            [("SNOWFLAKE_CONNECTIONS_DEV_ROLE", "dev_role")],
        ))
        .source(EnvironmentSource::with_vars(
            EnvironmentScheme::Cli,
            [("SNOWFLAKE_USER", "env_user")],
        ))
        .source(CliArgumentsSource::from_args(["--warehouse", "cli_wh"]))
        .build()
}

#[test]
fn test_full_chain_resolution() {
    let dir = TempDir::new().unwrap();
    let mut resolver = file_chain(&dir);
    let config = resolver.resolve(None, None).unwrap();

    // Legacy [connections] section becomes the default connection
    assert_eq!(config.get("connections.default.account"), Some(&json!("legacy_acct")));
    assert_eq!(config.get("connections.default.user"), Some(&json!("legacy_user")));
    assert_eq!(config.get("connections.default.password"), Some(&json!("legacy_pw")));

    // config.toml replaces the legacy prod connection wholesale
    let prod = config.connection("prod").unwrap();
    assert_eq!(prod.get("account"), Some(&json!("toml_prod")));
    assert!(prod.get("role").is_none());
    assert_eq!(prod.get("user"), Some(&json!("env_user")));

    let dev = config.connection("dev").unwrap();
    assert_eq!(dev.get("account"), Some(&json!("dev_acct")));
    assert_eq!(dev.get("port"), Some(&json!(443)));
    assert_eq!(dev.get("role"), Some(&json!("dev_role")));
    assert_eq!(dev.get("warehouse"), Some(&json!("cli_wh")));

    assert_eq!(config.get("default_connection_name"), Some(&json!("prod")));
    assert_eq!(config.get("variables.env"), Some(&json!("test")));
    assert_eq!(config.get("cli.logs.level"), Some(&json!("info")));
    assert!(config.get("options").is_none());

    assert!(resolver.get_source_diagnostics().is_empty());
}

#[test]
fn test_full_chain_history() {
    let dir = TempDir::new().unwrap();
    let mut resolver = file_chain(&dir);
    resolver.resolve(None, None).unwrap();

    let prod_account = resolver.get_resolution_history("connections.prod.account").unwrap();
    assert_eq!(prod_account.sources_consulted(), vec!["snowsql_config", "cli_config_toml"]);
    assert_eq!(prod_account.selected_entry().unwrap().source_name(), "cli_config_toml");

    let dev_role = resolver.get_resolution_history("connections.dev.role").unwrap();
    assert_eq!(dev_role.selected_entry().unwrap().source_name(), "connection_specific_env");

    let default_user = resolver.get_resolution_history("connections.default.user").unwrap();
    assert_eq!(default_user.selected_entry().unwrap().source_name(), "snowsql_config");
}

#[test]
fn test_missing_files_are_empty() {
    let dir = TempDir::new().unwrap();
    let mut resolver = ConfigurationResolver::builder()
        .source(LegacyIniSource::new(dir.path().join("absent.cnf")))
        .source(TomlFileSource::cli_config(dir.path().join("absent.toml")))
        .build();

    let config = resolver.resolve(None, None).unwrap();
    assert!(config.is_empty());
    assert!(resolver.get_source_diagnostics().is_empty());
}

#[test]
fn test_broken_toml_is_isolated() {
    let dir = TempDir::new().unwrap();
    let broken = write_private(dir.path(), "config.toml", "[connections.prod\npassword = \"hunter2\n");
    let mut resolver = ConfigurationResolver::builder()
        .source(TomlFileSource::cli_config(broken))
        .source(CliArgumentsSource::from_args(["--account", "cli_acct"]))
        .build();

    let config = resolver.resolve(None, None).unwrap();
    assert_eq!(config.get("connections.default.account"), Some(&json!("cli_acct")));

    let diagnostics = resolver.get_source_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].source_name, "cli_config_toml");
    assert_eq!(diagnostics[0].level, DiagnosticLevel::Error);
    assert!(!diagnostics[0].message.contains("hunter2"));
}

#[cfg(unix)]
#[test]
fn test_permission_policies() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("connections.toml");
    std::fs::write(&path, CONNECTIONS_TOML).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let warn = TomlFileSource::connections(&path).with_permission_policy(PermissionPolicy::Warn);
    assert!(!warn.discover(None).unwrap().is_empty());
    let diagnostics = warn.consume_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].level, DiagnosticLevel::Warning);
    assert!(diagnostics[0].message.contains("file permissions too open"));
    assert!(warn.consume_diagnostics().is_empty());

    let skip = TomlFileSource::connections(&path).with_permission_policy(PermissionPolicy::Skip);
    assert!(skip.discover(None).unwrap().is_empty());
    assert!(skip.consume_diagnostics()[0].message.contains("skipped"));

    let ignore = TomlFileSource::connections(&path).with_permission_policy(PermissionPolicy::Ignore);
    assert!(!ignore.discover(None).unwrap().is_empty());
    assert!(ignore.consume_diagnostics().is_empty());
}

#[test]
fn test_file_source_caches_parsed_output() {
    let dir = TempDir::new().unwrap();
    let path = write_private(dir.path(), "connections.toml", CONNECTIONS_TOML);
    let source = TomlFileSource::connections(&path);

    let first = source.discover(None).unwrap();
    std::fs::write(&path, "[other]\naccount = \"changed\"\n").unwrap();
    let second = source.discover(None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_default_chain_reads_process_environment() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("SNOWFLAKE_CONNECTIONS_CONFLUXIT_ACCOUNT", "scoped_acct");
    std::env::set_var("SNOWSQL_WAREHOUSE", "snowsql_wh");

    let dir = TempDir::new().unwrap();
    let settings = SourcesConfig {
        legacy_config_paths: Vec::new(),
        config_toml_path: dir.path().join("config.toml").to_string_lossy().to_string(),
        connections_toml_path: dir.path().join("connections.toml").to_string_lossy().to_string(),
        ..SourcesConfig::default()
    };
    let cli = CliArgumentsSource::from_args(["--role", "cli_role"]);
    let mut resolver = ConfigurationResolver::new(default_chain(&settings, Some(cli)));
    let config = resolver.resolve(None, None);

    std::env::remove_var("SNOWFLAKE_CONNECTIONS_CONFLUXIT_ACCOUNT");
    std::env::remove_var("SNOWSQL_WAREHOUSE");

    let config = config.unwrap();
    let connection = config.connection("confluxit").unwrap();
    assert_eq!(connection.get("account"), Some(&json!("scoped_acct")));
    assert_eq!(connection.get("warehouse"), Some(&json!("snowsql_wh")));
    assert_eq!(connection.get("role"), Some(&json!("cli_role")));
}
