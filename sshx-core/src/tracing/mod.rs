//! Tracing integration for structured logging
//!
//! The library only emits `tracing` events and spans. The binary installs a
//! subscriber once at startup through [`init_tracing`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Global flag indicating whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Environment variable holding a custom filter directive
pub const LOG_FILTER_ENV: &str = "SSHX_LOG";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// Tracing already initialized
    #[error("Tracing has already been initialized")]
    AlreadyInitialized,

    /// Failed to open the log file
    #[error("Failed to open log file {}: {source}", path.display())]
    FileCreationFailed {
        /// Requested log file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Tracing log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    /// Error level - only errors
    Error,
    /// Warn level - errors and warnings
    Warn,
    /// Info level - protocol progress (default)
    #[default]
    Info,
    /// Debug level - command lines and state transitions
    Debug,
    /// Trace level - everything
    Trace,
}

impl TracingLevel {
    /// Converts to tracing crate's Level
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Maps CLI flags to a level: `--quiet` wins, then each `-v` raises it
    #[must_use]
    pub const fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Error;
        }
        match verbose {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Output destination for tracing logs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Output to stderr, keeping stdout for command results
    #[default]
    Stderr,
    /// Append to a file, leaving stderr for warnings and errors only
    File {
        /// Path to the log file
        path: PathBuf,
    },
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log level
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Custom filter string (overrides level if set)
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: TracingLevel::Info,
            output: TracingOutput::Stderr,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Creates a new tracing configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets a custom filter string
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Reads a custom filter from [`LOG_FILTER_ENV`] if it is set
    #[must_use]
    pub fn with_env_filter(self) -> Self {
        match std::env::var(LOG_FILTER_ENV) {
            Ok(filter) if !filter.trim().is_empty() => self.with_filter(filter),
            _ => self,
        }
    }

    /// Writes to `path` instead of stderr when one is given
    #[must_use]
    pub fn with_log_file(self, path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => self.with_output(TracingOutput::File { path }),
            None => self,
        }
    }

    /// Filter directive applied when no custom filter is set
    #[must_use]
    pub fn default_directive(&self) -> String {
        format!("sshx={level},sshx_core={level}", level = self.level)
    }
}

/// Initializes the tracing subscriber with the given configuration
///
/// This function should be called once at application startup.
/// Subsequent calls will return an error.
///
/// # Errors
///
/// Returns an error if:
/// - File output is configured but the file cannot be opened
/// - Tracing has already been initialized
/// - The subscriber fails to initialize
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    let log_file = match &config.output {
        TracingOutput::Stderr => None,
        TracingOutput::File { path } => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TracingError::FileCreationFailed {
                    path: path.clone(),
                    source,
                })?,
        ),
    };

    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = if let Some(ref custom_filter) = config.filter {
        EnvFilter::try_new(custom_filter)
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))?
    } else {
        EnvFilter::try_new(config.default_directive()).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(true)
        .without_time();

    let result = match log_file {
        None => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_writer(std::io::stderr))
            .try_init(),
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_ansi(false).with_writer(file))
            .try_init(),
    };
    result.map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    tracing::debug!(level = %config.level, "Tracing initialized");

    Ok(())
}
