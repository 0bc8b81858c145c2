//! Error types for the authgraph crate

use declarative::{GraphError, LogicalId};
use thiserror::Error;

/// Invalid or incomplete input configuration.
///
/// Raised before any resource node is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `stack_name_base` is missing, empty or whitespace
    #[error("stack_name_base is required and must not be empty")]
    MissingStackName,

    /// `stack_name_base` cannot be used to name resources and state files
    #[error("stack_name_base '{name}' {reason}")]
    InvalidStackName { name: String, reason: &'static str },

    /// Only one half of the Google credentials was supplied
    #[error("google_oauth.{missing} is missing; client_id and client_secret must be set together")]
    IncompleteFederation { missing: &'static str },

    /// `callbackUrls` was supplied as an empty list
    #[error("callbackUrls must contain at least one URL when provided")]
    EmptyCallbackUrls,

    /// A callback URL is not an absolute http(s) URL
    #[error("invalid callback URL '{url}': {reason}")]
    InvalidCallbackUrl { url: String, reason: String },

    /// `admin_user_email` is blank or not an address
    #[error("admin_user_email '{0}' is not a valid email address")]
    InvalidAdminEmail(String),

    /// Account id or region was not supplied
    #[error("deployment {0} must not be empty")]
    MissingDeploymentContext(&'static str),
}

/// Failure to collect outward-facing identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// A required node was not applied
    #[error("no applied identifier for {0}")]
    MissingOutput(LogicalId),
}

/// Errors that can occur while planning or exporting a stack
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Graph construction or ordering error
    #[error("resource graph error: {0}")]
    Graph(#[from] GraphError),

    /// Export error
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Result type for authgraph operations
pub type Result<T> = std::result::Result<T, Error>;
