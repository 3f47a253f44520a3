use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request against a remote API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to send request to {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse {endpoint} JSON: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn endpoint(&self) -> &str {
        match self {
            ClientError::Transport { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
