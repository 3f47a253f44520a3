use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;

/// Send `request`, require a success status and parse the body as JSON.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    endpoint: &str,
) -> Result<T, ClientError> {
    let res = request.send().await.map_err(|source| ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|source| ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;
    debug!(endpoint, %status, bytes = body.len(), "response received");

    if !status.is_success() {
        return Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| ClientError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Coordinate component with six fractional digits.
pub(crate) fn fixed6(value: f64) -> String {
    format!("{value:.6}")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
