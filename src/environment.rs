//! Runtime environment selection.
//!
//! The environment picks the configuration file (`config/{env}.yaml`) and is
//! resolved from `--environment`, then `JAGUAR_ENV`, then defaults to
//! `development`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};

pub const DEFAULT_ENVIRONMENT: &str = "development";
const ENV_VARS: &[&str] = &["JAGUAR_ENV"];

/// Resolves the environment name from the process environment.
#[must_use]
pub fn resolve_from_env() -> String {
    ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    #[serde(rename = "production")]
    Production,
    #[serde(rename = "development")]
    Development,
    #[serde(rename = "test")]
    Test,
    Any(String),
}

impl Environment {
    /// Loads the configuration matching this environment.
    ///
    /// # Errors
    /// Returns an error when the configuration file cannot be found, rendered
    /// or parsed.
    pub fn load(&self) -> Result<Config, ConfigError> {
        Config::new(self)
    }
}

impl From<String> for Environment {
    fn from(env: String) -> Self {
        Self::from_str(&env).unwrap_or(Self::Any(env))
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "production" => Self::Production,
            "development" => Self::Development,
            "test" => Self::Test,
            other => Self::Any(other.to_string()),
        })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
            Self::Test => f.write_str("test"),
            Self::Any(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_custom_environments() {
        assert_eq!(Environment::from("production".to_string()), Environment::Production);
        assert_eq!(Environment::from("test".to_string()), Environment::Test);
        assert_eq!(
            Environment::from("staging".to_string()),
            Environment::Any("staging".to_string())
        );
        assert_eq!(Environment::Any("staging".to_string()).to_string(), "staging");
    }
}
