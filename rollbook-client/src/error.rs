//! Error types for the REST client

use rollbook_common::ApiError;
use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection, timeout, undecodable body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// A success response whose body has an unexpected shape
    #[error("unexpected response body: {message}")]
    UnexpectedBody { message: String },
}

impl ClientError {
    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn unexpected_body(message: impl Into<String>) -> Self {
        Self::UnexpectedBody {
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Api(err) => err.status,
            Self::InvalidUrl { .. } | Self::UnexpectedBody { .. } => None,
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api(api) => api,
            other => ApiError {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
