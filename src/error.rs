//! Error types for the OCD item transformers
//!
//! A transformation call itself never fails: absent or malformed fields are
//! degraded in place. These errors cover the surfaces around it (reading raw
//! XML, compiling query expressions, configuration and the CLI).

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Invalid query expression: {0}")]
    InvalidExpression(String),

    #[error("Unknown transformer: {0}")]
    UnknownTransformer(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
