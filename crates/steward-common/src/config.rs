//! Controller configuration
//!
//! [`ControllerArgs`] is a `clap::Args` group an embedding binary flattens
//! into its own CLI. Every flag falls back to a `STEWARD_*` environment
//! variable so the operator can be configured from a Deployment manifest.

use std::time::Duration;

use clap::Args;

use crate::telemetry::{LogConfig, LogFormat, Verbosity};

/// Watcher timeout (seconds); must stay below the client read timeout (30s)
pub const DEFAULT_WATCH_TIMEOUT_SECS: u32 = 25;

/// Requeue delay (seconds) applied when a reconcile returns an unclassified error
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 5;

/// Command-line and environment configuration for the Jenkins controller
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct ControllerArgs {
    /// Log verbosity for steward components
    #[arg(long, env = "STEWARD_LOG_LEVEL", value_enum, default_value_t = Verbosity::Info)]
    pub log_level: Verbosity,

    /// Log output format
    #[arg(long, env = "STEWARD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Only watch Jenkins objects in this namespace (all namespaces when unset)
    #[arg(long, env = "STEWARD_WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Server-side watch timeout in seconds
    #[arg(long, env = "STEWARD_WATCH_TIMEOUT_SECS", default_value_t = DEFAULT_WATCH_TIMEOUT_SECS)]
    pub watch_timeout_secs: u32,

    /// Delay before retrying a reconcile that failed with an unclassified error
    #[arg(long, env = "STEWARD_ERROR_REQUEUE_SECS", default_value_t = DEFAULT_ERROR_REQUEUE_SECS)]
    pub error_requeue_secs: u64,
}

/// Typed settings consumed by the controller runner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Namespace to watch, or all namespaces
    pub watch_namespace: Option<String>,
    /// Server-side watch timeout in seconds
    pub watch_timeout_secs: u32,
    /// Backoff applied by the error policy
    pub error_requeue: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            watch_timeout_secs: DEFAULT_WATCH_TIMEOUT_SECS,
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

impl ControllerArgs {
    /// Logging configuration derived from the flags
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            verbosity: self.log_level,
            format: self.log_format,
        }
    }

    /// Runner configuration derived from the flags
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            watch_namespace: self.watch_namespace.clone(),
            watch_timeout_secs: self.watch_timeout_secs,
            error_requeue: Duration::from_secs(self.error_requeue_secs),
        }
    }
}
