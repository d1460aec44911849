//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use crate::domain::errors::ConfluxError;
use crate::domain::result::Result;
use crate::sources::PermissionPolicy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AppConfig
/// 4. Applies environment variable overrides (CONFLUX_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use conflux::config::loader::load_config;
///
/// let config = load_config("conflux.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfluxError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ConfluxError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| ConfluxError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ConfluxError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Loads configuration, falling back to defaults when the file is absent
///
/// Environment overrides are applied in both cases.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be loaded.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No settings file, using defaults");
    let mut config = AppConfig::default();
    apply_env_overrides(&mut config)?;
    config
        .validate()
        .map_err(|e| ConfluxError::Configuration(format!("Configuration validation failed: {e}")))?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ConfluxError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ConfluxError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the CONFLUX_* prefix
///
/// Variables follow the pattern CONFLUX_<SECTION>_<KEY>, for example
/// CONFLUX_SOURCES_CONFIG_TOML_PATH or CONFLUX_HISTORY_ENABLED.
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    // Sources overrides
    if let Ok(val) = std::env::var("CONFLUX_SOURCES_LEGACY_CONFIG_PATHS") {
        config.sources.legacy_config_paths = val
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Ok(val) = std::env::var("CONFLUX_SOURCES_CONFIG_TOML_PATH") {
        config.sources.config_toml_path = val;
    }
    if let Ok(val) = std::env::var("CONFLUX_SOURCES_CONNECTIONS_TOML_PATH") {
        config.sources.connections_toml_path = val;
    }
    if let Ok(val) = std::env::var("CONFLUX_SOURCES_ENVIRONMENT_ENABLED") {
        config.sources.environment_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("CONFLUX_SOURCES_PERMISSION_POLICY") {
        config.sources.permission_policy = match val.to_lowercase().as_str() {
            "ignore" => PermissionPolicy::Ignore,
            "warn" => PermissionPolicy::Warn,
            "skip" => PermissionPolicy::Skip,
            other => {
                return Err(ConfluxError::Configuration(format!(
                    "Invalid CONFLUX_SOURCES_PERMISSION_POLICY '{other}'. Must be one of: ignore, warn, skip"
                )))
            }
        };
    }

    // History overrides
    if let Ok(val) = std::env::var("CONFLUX_HISTORY_ENABLED") {
        config.history.enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("CONFLUX_HISTORY_REDACT_EXPORTS") {
        config.history.redact_exports = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CONFLUX_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CONFLUX_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CONFLUX_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CONFLUX_LOADER_TEST_VAR", "test_value");
        let input = "path = \"${CONFLUX_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "path = \"test_value\"\n");
        std::env::remove_var("CONFLUX_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CONFLUX_LOADER_MISSING_VAR");
        let input = "path = \"${CONFLUX_LOADER_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("CONFLUX_LOADER_COMMENTED_VAR");
        let input = "# path = \"${CONFLUX_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent-conflux.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[sources]
legacy_config_paths = ["/etc/snowsql.cnf"]
config_toml_path = "/tmp/conflux/config.toml"

[logging]
local_rotation = "hourly"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.sources.legacy_config_paths, vec!["/etc/snowsql.cnf"]);
        assert_eq!(config.sources.config_toml_path, "/tmp/conflux/config.toml");
        assert_eq!(config.logging.local_rotation, "hourly");
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = load_or_default("/nonexistent/conflux.toml").unwrap();
        assert_eq!(config.sources.connections_toml_path, "~/.snowflake/connections.toml");
    }
}
