//! Connection parameters given as command-line flags

use crate::config::SecretArg;
use crate::sources::CliArgumentsSource;
use clap::Args;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::num::ParseIntError;
use std::str::FromStr;

/// Port flag that remembers how it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortArg {
    pub port: u16,
    pub text: String,
}

impl FromStr for PortArg {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            port: s.trim().parse()?,
            text: s.to_string(),
        })
    }
}

/// Flags overriding connection parameters
///
/// These form the highest-precedence source of every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionOverrides {
    /// Account identifier
    #[arg(long)]
    pub account: Option<String>,

    /// User name
    #[arg(long)]
    pub user: Option<String>,

    /// Password
    #[arg(long)]
    pub password: Option<SecretArg>,

    /// Role
    #[arg(long)]
    pub role: Option<String>,

    /// Warehouse
    #[arg(long)]
    pub warehouse: Option<String>,

    /// Database
    #[arg(long)]
    pub database: Option<String>,

    /// Schema
    #[arg(long)]
    pub schema: Option<String>,

    /// Host name
    #[arg(long)]
    pub host: Option<String>,

    /// Port
    #[arg(long)]
    pub port: Option<PortArg>,

    /// Authenticator
    #[arg(long)]
    pub authenticator: Option<String>,
}

impl ConnectionOverrides {
    /// Converts the given flags into the CLI-arguments source
    pub fn to_source(&self) -> CliArgumentsSource {
        let strings = [
            ("account", &self.account),
            ("user", &self.user),
            ("role", &self.role),
            ("warehouse", &self.warehouse),
            ("database", &self.database),
            ("schema", &self.schema),
            ("host", &self.host),
            ("authenticator", &self.authenticator),
        ];

        let mut pairs: Vec<(&str, Value)> = strings
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, Value::String(v))))
            .collect();
        if let Some(password) = &self.password {
            pairs.push((
                "password",
                Value::String(password.0.expose_secret().as_ref().to_string()),
            ));
        }
        if let Some(port) = &self.port {
            pairs.push(("port", Value::from(port.port)));
        }

        let source = CliArgumentsSource::from_pairs(pairs);
        match &self.port {
            Some(port) => source.with_raw_text("port", port.text.as_str()),
            None => source,
        }
    }
}
