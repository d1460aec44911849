//! Known connection parameter names
//!
//! Connection-shaped keys found at the root of a source are "general"
//! parameters: they are broadcast into every connection or used to synthesize
//! the implicit `default` connection.

/// Parameters that describe a connection
pub const CONNECTION_PARAMETERS: &[&str] = &[
    "account",
    "user",
    "password",
    "host",
    "port",
    "region",
    "protocol",
    "database",
    "schema",
    "role",
    "warehouse",
    "authenticator",
    "private_key_file",
    "private_key_path",
    "private_key_passphrase",
    "token",
    "token_file_path",
    "oauth_client_id",
    "oauth_client_secret",
    "session_token",
    "master_token",
    "mfa_passcode",
    "client_store_temporary_credential",
    "workload_identity_provider",
];

/// Root keys that never take part in default connection synthesis
pub const NON_CONNECTION_ROOT_KEYS: &[&str] =
    &["connections", "variables", "cli", "default_connection_name"];

/// Name of the connection synthesized from free-standing parameters
pub const DEFAULT_CONNECTION_NAME: &str = "default";

const SENSITIVE_FRAGMENTS: &[&str] = &[
    "password",
    "passwd",
    "pwd",
    "passphrase",
    "token",
    "secret",
    "passcode",
];

/// Returns true if `key` names a connection parameter
pub fn is_connection_parameter(key: &str) -> bool {
    CONNECTION_PARAMETERS.contains(&key)
}

/// Returns true if `key` can take part in default connection synthesis
pub fn is_synthesis_eligible(key: &str) -> bool {
    !NON_CONNECTION_ROOT_KEYS.contains(&key)
}

/// Returns true if values under `key` must never be shown in clear text
///
/// Only the last segment of a dotted key is inspected, so
/// `connections.prod.password` is sensitive while `connections.password_hint`
/// style names are judged on their own segment.
pub fn is_sensitive_key(key: &str) -> bool {
    let leaf = key.rsplit('.').next().unwrap_or(key).to_ascii_lowercase();
    SENSITIVE_FRAGMENTS
        .iter()
        .any(|fragment| leaf.contains(fragment))
}
