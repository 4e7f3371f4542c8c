//! Application configuration.
//!
//! Configuration lives in `config/{environment}.yaml` (a sibling
//! `{environment}.local.yaml` wins when present). Files are rendered with
//! `tera` before parsing so values can be pulled from the process
//! environment:
//!
//! ```yaml
//! ai:
//!   assistant:
//!     kind: openai
//!     api_key: {{ get_env(name="OPENAI_API_KEY", default="") }}
//! ```
//!
//! The folder can be moved with `JAGUAR_CONFIG_FOLDER`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ai::{agent::DEFAULT_MAX_TOOL_ROUNDS, prompt::AGENT_NAME},
    environment::Environment,
    logger,
};

const CONFIG_FOLDER_ENV: &str = "JAGUAR_CONFIG_FOLDER";
const DEFAULT_CONFIG_FOLDER: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration file for environment `{environment}` in `{folder}`")]
    NotFound {
        environment: String,
        folder: PathBuf,
    },
    #[error("cannot read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot render configuration template: {0}")]
    Template(#[from] tera::Error),
    #[error("cannot parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logger: logger::Config,
    pub server: Server,
    pub store: StoreSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub data: DataSettings,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Server {
    /// The address on which the server should listen on for incoming
    /// connections.
    #[serde(default = "default_binding")]
    pub binding: String,
    /// The port on which the server should listen for incoming connections.
    pub port: u16,
    /// The webserver host, used when printing the listening address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Upper bound for handling a single request, model round trips included.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Allow cross-origin requests from any origin.
    #[serde(default)]
    pub cors: bool,
}

impl Server {
    #[must_use]
    pub fn full_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_binding() -> String {
    "localhost".to_string()
}

fn default_host() -> String {
    "http://localhost".to_string()
}

fn default_request_timeout_ms() -> u64 {
    120_000
}

/// Location of the SPARQL endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Base URL of the store, e.g. `http://localhost:7200`.
    pub endpoint: String,
    /// Repository identifier appended as `/repositories/{repository}`.
    #[serde(default)]
    pub repository: String,
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_store_timeout_ms() -> u64 {
    30_000
}

/// AI configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AiSettings {
    /// Hosted model used by the agent; absent means the agent is unavailable.
    #[serde(default)]
    pub assistant: Option<KnowledgeAssistantBackend>,
    #[serde(default)]
    pub agent: AgentSettings,
}

/// Supported model providers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum KnowledgeAssistantBackend {
    #[serde(rename = "openai")]
    OpenAi(OpenAiSettings),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiSettings {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Alternative OpenAI compatible base URL.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSettings {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    /// Replaces the built-in system prompt.
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            max_tool_rounds: default_max_tool_rounds(),
            instructions: None,
        }
    }
}

fn default_agent_name() -> String {
    AGENT_NAME.to_string()
}

fn default_max_tool_rounds() -> usize {
    DEFAULT_MAX_TOOL_ROUNDS
}

/// Inputs of the one-time import.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSettings {
    #[serde(default = "default_csv")]
    pub csv: PathBuf,
    /// Additional Turtle documents loaded verbatim.
    #[serde(default)]
    pub turtle: Vec<PathBuf>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            csv: default_csv(),
            turtle: Vec::new(),
        }
    }
}

fn default_csv() -> PathBuf {
    PathBuf::from("data/jaguars.csv")
}

impl Config {
    /// Loads the configuration of `env` from the configuration folder.
    ///
    /// # Errors
    /// Returns an error when no file exists or the file is invalid.
    pub fn new(env: &Environment) -> Result<Self, ConfigError> {
        let folder = std::env::var(CONFIG_FOLDER_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FOLDER), PathBuf::from);
        Self::from_folder(env, &folder)
    }

    /// Loads the configuration of `env` from `folder`.
    ///
    /// # Errors
    /// Returns an error when no file exists or the file is invalid.
    pub fn from_folder(env: &Environment, folder: &Path) -> Result<Self, ConfigError> {
        let candidates = [
            folder.join(format!("{env}.local.yaml")),
            folder.join(format!("{env}.yaml")),
        ];
        let path = candidates
            .iter()
            .find(|path| path.exists())
            .ok_or_else(|| ConfigError::NotFound {
                environment: env.to_string(),
                folder: folder.to_path_buf(),
            })?;

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "config_loaded");
        Ok(config)
    }

    /// Renders and parses a configuration document.
    ///
    /// # Errors
    /// Returns an error when rendering, parsing or validation fails.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let rendered = tera::Tera::one_off(content, &tera::Context::new(), false)?;
        let config: Self = serde_yaml::from_str(&rendered)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that would otherwise only fail on first use.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.store.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "`store.endpoint` must be provided".to_string(),
            ));
        }
        let url = reqwest::Url::parse(endpoint).map_err(|err| {
            ConfigError::Invalid(format!("`store.endpoint` is not a valid URL: {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "`store.endpoint` must use http or https, got `{}`",
                url.scheme()
            )));
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "`store.timeout_ms` must be greater than zero".to_string(),
            ));
        }
        if self.ai.agent.max_tool_rounds == 0 {
            return Err(ConfigError::Invalid(
                "`ai.agent.max_tool_rounds` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
