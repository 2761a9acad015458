//! Unified error type for atelier.

use thiserror::Error;

/// Errors that can occur while generating images or touching local state.
#[derive(Debug, Error)]
pub enum AtelierError {
    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The durable history store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A generation is already in flight for this session.
    #[error("A generation is already in progress")]
    AlreadyInProgress,

    /// No API key configured.
    #[error("No API key configured. Set {env_var} or add it to the config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },

    /// The generation call failed. Network, quota, and malformed-response
    /// causes are collapsed into this one user-facing category.
    #[error("Image generation failed, try again")]
    Generation,

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),
}
