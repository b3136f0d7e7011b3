//! Structured logging for conversion runs.
//!
//! Events go through a non-blocking appender. Human-readable lines are the
//! default; `GEOCHEM_RDF_LOG_FORMAT=json` switches to one JSON object per
//! event for batch pipelines.

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display, EnumString};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const FORMAT_VAR: &str = "GEOCHEM_RDF_LOG_FORMAT";
const SINK_VAR: &str = "GEOCHEM_RDF_LOG_SINK";
const DIR_VAR: &str = "GEOCHEM_RDF_LOG_DIR";
const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where log events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogSink {
    Stdout,
    #[default]
    Stderr,
    File,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub sink: LogSink,
    /// Only used by [`LogSink::File`].
    pub log_dir: PathBuf,
    pub file_prefix: String,
    pub daily_rotation: bool,
    /// Fallback filter when `RUST_LOG` is unset.
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            sink: LogSink::default(),
            log_dir: PathBuf::from("logs"),
            file_prefix: format!("{}.log", env!("CARGO_PKG_NAME")),
            daily_rotation: true,
            default_directive: DEFAULT_DIRECTIVE.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Applies the `GEOCHEM_RDF_LOG_*` variables over the defaults. Values
    /// that do not parse leave the default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(raw: Option<String>) -> Option<T> {
            raw.and_then(|value| value.trim().parse().ok())
        }

        let mut config = Self::default();
        if let Some(format) = parsed(lookup(FORMAT_VAR)) {
            config.format = format;
        }
        if let Some(sink) = parsed(lookup(SINK_VAR)) {
            config.sink = sink;
        }
        if let Some(dir) = lookup(DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            config.log_dir = PathBuf::from(dir);
        }
        config
    }

    /// Stdout belongs to the graph when no output file was given.
    pub fn keep_stdout_clean(mut self, graph_on_stdout: bool) -> Self {
        if graph_on_stdout && self.sink == LogSink::Stdout {
            self.sink = LogSink::Stderr;
        }
        self
    }

    fn writer(&self) -> Result<(NonBlocking, WorkerGuard)> {
        Ok(match self.sink {
            LogSink::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogSink::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogSink::File => {
                std::fs::create_dir_all(&self.log_dir).with_context(|| {
                    format!("failed to create log directory {}", self.log_dir.display())
                })?;
                let appender = if self.daily_rotation {
                    tracing_appender::rolling::daily(&self.log_dir, &self.file_prefix)
                } else {
                    tracing_appender::rolling::never(&self.log_dir, &self.file_prefix)
                };
                tracing_appender::non_blocking(appender)
            }
        })
    }
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered events are flushed.
pub fn init_logging(config: LoggingConfig) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_directive))
        .context("invalid log filter")?;
    let (writer, guard) = config.writer()?;

    let layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(true)
            .with_span_list(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_ansi(config.sink == LogSink::Stderr)
            .with_filter(filter)
            .boxed(),
    };
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .context("logging already initialised")?;

    tracing::debug!(format = %config.format, sink = %config.sink, "logging ready");
    Ok(guard)
}

/// Root span for one workbook; stage spans from the converter nest inside.
pub fn conversion_span(workbook: &Path) -> tracing::Span {
    tracing::info_span!(
        "conversion",
        workbook = %workbook.display(),
        converter = env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_log_pretty_lines_to_stderr() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.sink, LogSink::Stderr);
        assert_eq!(config.file_prefix, "geochem-rdf.log");
    }

    #[test]
    fn environment_overrides_parse_case_insensitively() {
        let config = LoggingConfig::from_lookup(lookup(&[
            (FORMAT_VAR, "JSON"),
            (SINK_VAR, "file"),
            (DIR_VAR, "/var/log/geochem"),
        ]));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.sink, LogSink::File);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/geochem"));
    }

    #[test]
    fn unknown_values_keep_defaults() {
        let config = LoggingConfig::from_lookup(lookup(&[(FORMAT_VAR, "xml"), (DIR_VAR, " ")]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn stdout_sink_moves_aside_for_the_graph() {
        let config = LoggingConfig::from_lookup(lookup(&[(SINK_VAR, "stdout")]));
        assert_eq!(config.clone().keep_stdout_clean(false).sink, LogSink::Stdout);
        assert_eq!(config.keep_stdout_clean(true).sink, LogSink::Stderr);
    }
}
