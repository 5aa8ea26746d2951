//! Error handling for the lite-server status tool
//!
//! Configuration failures are fatal and surface as [`AppError`]. Per-endpoint
//! probe failures are never errors; they are recorded as
//! [`crate::types::ProbeErrorKind`] values inside the report.

use thiserror::Error;

/// Fatal errors of a `status` invocation
#[derive(Error, Debug)]
pub enum AppError {
    /// Local config path does not exist
    #[error("Config not found: {path}")]
    ConfigNotFound { path: String },

    /// Remote config could not be fetched or returned an error status
    #[error("Failed to fetch config from {url}: {reason}")]
    ConfigFetch { url: String, reason: String },

    /// Config document is not valid JSON or misses required fields
    #[error("Invalid config document: {0}")]
    ConfigParse(String),

    /// Network name did not match a known preset
    #[error("Unsupported network: '{0}' (expected 'mainnet' or 'testnet')")]
    InvalidNetwork(String),

    /// Invalid runtime setting (timeouts, concurrency, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config_not_found<S: Into<String>>(path: S) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_fetch<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        Self::ConfigFetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn config_parse<S: Into<String>>(message: S) -> Self {
        Self::ConfigParse(message.into())
    }

    pub fn invalid_network<S: Into<String>>(name: S) -> Self {
        Self::InvalidNetwork(name.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            Self::ConfigFetch { .. } => "CONFIG_FETCH",
            Self::ConfigParse(_) => "CONFIG_PARSE",
            Self::InvalidNetwork(_) => "NETWORK",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParse(_)
            | Self::InvalidNetwork(_)
            | Self::Validation(_) => 1, // Invalid configuration/usage
            Self::ConfigFetch { .. } => 2, // Network issues
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Short troubleshooting hints printed under the error line
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::ConfigNotFound { .. } => &[
                "Check the path passed to -c/--config",
                "Omit -c to use the built-in preset for the network",
            ],
            Self::ConfigFetch { .. } => &[
                "Check your internet connection",
                "Verify the URL in a browser or with curl",
                "Download the document and pass the local path instead",
            ],
            Self::ConfigParse(_) => &[
                "The document must be a TON global config or a JSON array of lite-servers",
                "Every lite-server needs an address (ip or host), a port and an ed25519 public key",
            ],
            Self::InvalidNetwork(_) => &["Use -n mainnet or -n testnet"],
            Self::Validation(_) => &["Check ADNLCTL_* environment variables and command line flags"],
            Self::Io(_) | Self::Internal(_) => &[],
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::ConfigFetch { .. } => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) | Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
                _ => format!("[{}] {}", category.red().bold(), message.red()),
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::config_parse(format!("JSON parse error: {}", error))
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::validation(format!("URL parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::validation(format!("Environment file error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
