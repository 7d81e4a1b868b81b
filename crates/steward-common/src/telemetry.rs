//! Logging initialization
//!
//! Verbosity is explicit configuration handed to [`init_logging`], not read
//! from ambient process state. Components log through `tracing` macros with
//! structured fields; the controller opens one span per reconcile carrying
//! the Jenkins identity.

use std::fmt;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive built from the configured verbosity was rejected
    #[error("invalid log filter '{directive}': {message}")]
    Filter {
        /// Directive that failed to parse
        directive: String,
        /// Parser message
        message: String,
    },

    /// Failed to install the global subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Log verbosity of steward's own targets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Verbosity {
    /// Errors only
    Error,
    /// Warnings, including validation failures
    #[value(alias = "warning")]
    Warn,
    /// Phase transitions and completions
    #[default]
    Info,
    /// Per-step decisions
    Debug,
    /// Everything
    Trace,
}

impl Verbosity {
    fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for log lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// JSON lines with span context, for log collectors
    #[default]
    Json,
    /// Human-readable text
    Text,
}

/// Configuration for logging initialization
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Verbosity for steward targets; dependencies are capped lower
    pub verbosity: Verbosity,
    /// Output format
    pub format: LogFormat,
}

impl LogConfig {
    /// Filter directive derived from the configured verbosity
    pub fn filter_directive(&self) -> String {
        format!(
            "warn,steward_common={v},steward_controller={v},kube=info,tower=warn,hyper=warn",
            v = self.verbosity
        )
    }

    fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        let directive = self.filter_directive();
        EnvFilter::try_new(&directive).map_err(|e| TelemetryError::Filter {
            directive,
            message: e.to_string(),
        })
    }
}

/// Install the global tracing subscriber for the given configuration
///
/// # Example
///
/// ```ignore
/// use steward_common::telemetry::{init_logging, LogConfig, Verbosity};
///
/// init_logging(&LogConfig { verbosity: Verbosity::Debug, ..Default::default() })?;
/// ```
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;
    use rstest::rstest;

    #[rstest]
    #[case("error", Verbosity::Error)]
    #[case("WARNING", Verbosity::Warn)]
    #[case("info", Verbosity::Info)]
    #[case("Debug", Verbosity::Debug)]
    #[case("trace", Verbosity::Trace)]
    fn parses_verbosity(#[case] input: &str, #[case] expected: Verbosity) {
        assert_eq!(Verbosity::from_str(input, true).unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_verbosity() {
        assert!(Verbosity::from_str("loud", true).is_err());
    }

    #[test]
    fn filter_directive_scopes_verbosity_to_steward_targets() {
        let config = LogConfig {
            verbosity: Verbosity::Debug,
            format: LogFormat::Text,
        };
        let directive = config.filter_directive();
        assert!(directive.contains("steward_controller=debug"));
        assert!(directive.contains("kube=info"));
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn default_config_is_info_json() {
        let config = LogConfig::default();
        assert_eq!(config.verbosity, Verbosity::Info);
        assert_eq!(config.format, LogFormat::Json);
    }
}
