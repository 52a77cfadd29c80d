//! Unified error handling.
//!
//! A `thiserror`-based model with:
//!   * Typed variants for the tool's failure domains
//!   * A categorization layer (`ErrorCategory`) for reporting
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Design goals:
//!   * Keep end-user messages clear & actionable
//!   * Avoid leaking internal implementation details
//!   * Keep the fatal/non-fatal split (configuration and output errors
//!     abort the run; per-row and per-lookup problems are warnings owned
//!     by the driver, not errors in this module)

use std::io;

use thiserror::Error;

/// High-level classification for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Parse,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum EnricherError {
    // ------------------------ Input / Validation ----------------------------
    #[error("The input file {path} does not exist")]
    MissingInputFile { path: String },

    #[error("The column {column} does not exist in the input file")]
    MissingColumn { column: String },

    #[error("Unsupported file format: {extension} ({path})")]
    UnsupportedFormat { path: String, extension: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ---------------------------- Parsing -----------------------------------
    #[error("Failed to read table {path}: {reason}")]
    TableRead { path: String, reason: String },

    #[error("Failed to write table {path}: {reason}")]
    TableWrite { path: String, reason: String },

    // ----------------------------- Network ----------------------------------
    #[error("Reputation lookup failed for IP {ip}: {source}")]
    Lookup {
        ip: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EnricherError {
    /// Categorize the error for reporting.
    pub fn category(&self) -> ErrorCategory {
        use EnricherError::*;
        match self {
            MissingInputFile { .. }
            | MissingColumn { .. }
            | UnsupportedFormat { .. }
            | Configuration { .. } => ErrorCategory::Input,

            TableRead { .. } | TableWrite { .. } => ErrorCategory::Parse,

            Lookup { .. } => ErrorCategory::Network,

            Io { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn missing_input_file(path: impl Into<String>) -> Self {
        Self::MissingInputFile { path: path.into() }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn unsupported_format(path: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            extension: extension.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn table_read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TableRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn table_write(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TableWrite {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn lookup(
        ip: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Lookup {
            ip: ip.into(),
            source: source.into(),
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, EnricherError>;

/// Map standard IO errors into `Io` variant (generic context).
impl From<io::Error> for EnricherError {
    fn from(e: io::Error) -> Self {
        EnricherError::Io {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| EnricherError::io(path.into(), operation.into(), e))
    }
}
