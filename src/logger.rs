//! Initializes the `tracing` subscriber from the `logger` configuration.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::{Error, Result};

/// Crates whose events are shown when no `override_filter` is set.
const MODULE_WHITELIST: &[&str] = &["tower_http", "jaguar_kg"];

static NONBLOCKING_WORK_GUARD_KEEP: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub enum LogLevel {
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub enum Format {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub enum Rotation {
    #[serde(rename = "minutely")]
    Minutely,
    #[serde(rename = "hourly")]
    #[default]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "never")]
    Never,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Enable log collection.
    pub enable: bool,
    /// Set the logger level.
    #[serde(default)]
    pub level: LogLevel,
    /// Set the logger format.
    #[serde(default)]
    pub format: Format,
    /// Replaces the built-in module whitelist with a raw `EnvFilter`
    /// directive, e.g. `jaguar_kg=debug,reqwest=info`.
    pub override_filter: Option<String>,
    /// Write logs to files as well.
    pub file_appender: Option<FileAppender>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileAppender {
    pub enable: bool,
    #[serde(default)]
    pub non_blocking: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub rotation: Rotation,
    pub dir: Option<String>,
    pub filename_prefix: Option<String>,
    pub filename_suffix: Option<String>,
    pub max_log_files: usize,
}

/// Builds the event filter for `level`.
///
/// `RUST_LOG` wins over configuration, then `override_filter`, then the
/// whitelist of this crate and `tower_http` at `level`.
///
/// # Errors
/// Returns an error when `override_filter` is not a valid directive.
pub fn env_filter(config: &Config, level: &LogLevel) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = config.override_filter.clone().unwrap_or_else(|| {
        MODULE_WHITELIST
            .iter()
            .map(|module| format!("{module}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    });
    EnvFilter::try_new(&directive)
        .map_err(|err| Error::Message(format!("invalid log filter `{directive}`: {err}")))
}

/// Installs the global subscriber.
///
/// Calling it again after a subscriber is set is a no-op.
///
/// # Errors
/// Returns an error when a filter directive is invalid or the rolling file
/// appender cannot be created.
pub fn init(config: &Config) -> Result<()> {
    if !config.enable {
        return Ok(());
    }

    let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();

    if let Some(file_appender) = config.file_appender.as_ref().filter(|f| f.enable) {
        let mut builder = tracing_appender::rolling::Builder::new()
            .max_log_files(file_appender.max_log_files)
            .rotation(match file_appender.rotation {
                Rotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
                Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
                Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
                Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
            });
        if let Some(prefix) = &file_appender.filename_prefix {
            builder = builder.filename_prefix(prefix);
        }
        if let Some(suffix) = &file_appender.filename_suffix {
            builder = builder.filename_suffix(suffix);
        }
        let dir = file_appender.dir.as_deref().unwrap_or("./logs");
        let appender = builder
            .build(dir)
            .map_err(|err| Error::Message(format!("cannot create log appender in `{dir}`: {err}")))?;

        let filter = env_filter(config, &file_appender.level)?;
        if file_appender.non_blocking {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = NONBLOCKING_WORK_GUARD_KEEP.set(guard);
            layers.push(init_layer(writer, &file_appender.format, false, filter));
        } else {
            layers.push(init_layer(appender, &file_appender.format, false, filter));
        }
    }

    layers.push(init_layer(
        std::io::stdout,
        &config.format,
        true,
        env_filter(config, &config.level)?,
    ));

    if tracing_subscriber::registry().with(layers).try_init().is_err() {
        tracing::debug!("logger_already_initialized");
    }
    Ok(())
}

fn init_layer<W2>(
    make_writer: W2,
    format: &Format,
    ansi: bool,
    filter: EnvFilter,
) -> Box<dyn Layer<Registry> + Sync + Send>
where
    W2: for<'writer> MakeWriter<'writer> + Sync + Send + 'static,
{
    match format {
        Format::Compact => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .compact()
            .with_filter(filter)
            .boxed(),
        Format::Pretty => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .pretty()
            .with_filter(filter)
            .boxed(),
        Format::Json => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .json()
            .with_filter(filter)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(override_filter: Option<&str>) -> Config {
        Config {
            enable: true,
            level: LogLevel::Debug,
            format: Format::Compact,
            override_filter: override_filter.map(ToString::to_string),
            file_appender: None,
        }
    }

    #[test]
    fn levels_display_as_filter_names() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::default().to_string(), "info");
    }

    #[test]
    fn rejects_invalid_override_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(env_filter(&config(Some("jaguar_kg=debug")), &LogLevel::Info).is_ok());
        assert!(env_filter(&config(Some("jaguar_kg=[")), &LogLevel::Info).is_err());
    }

    #[test]
    fn disabled_logger_installs_nothing() {
        let mut disabled = config(None);
        disabled.enable = false;
        assert!(init(&disabled).is_ok());
    }
}
