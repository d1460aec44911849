//! Masking of secrets in log and diagnostic text
//!
//! Source error messages may quote the offending line of a file or the value
//! of an environment variable. They pass through [`sanitize_message`] before
//! being logged or stored.

use regex::Regex;
use std::sync::LazyLock;

const MASK: &str = "****";

static SECRET_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)([a-z0-9_]*(?:password|passwd|pwd|passphrase|token|secret|passcode)"?)(\s*[=:]\s*)("[^"]*"|'[^']*'|[^\s,;&]+)"#,
    )
    .expect("secret assignment pattern is valid")
});

static URL_USERINFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(://[^:/\s@]+):[^@/\s]+@").expect("URL user-info pattern is valid")
});

/// Replaces secret values in `message` with a mask
pub fn sanitize_message(message: &str) -> String {
    let masked = SECRET_ASSIGNMENT.replace_all(message, format!("${{1}}${{2}}{MASK}"));
    URL_USERINFO
        .replace_all(&masked, format!("${{1}}:{MASK}@"))
        .into_owned()
}
