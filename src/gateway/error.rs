use thiserror::Error;

/// Failure talking to the swing API or to object storage.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The server could not be reached at all. Reported as status code 0.
    #[error("Network error: unable to connect to {url} ({detail})")]
    Network { url: String, detail: String },

    #[error("HTTP error! status: {status} - {body}")]
    Http { status: u16, body: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },
}

impl GatewayError {
    pub(crate) fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GatewayError::Decode {
                endpoint: url.to_string(),
                detail: err.to_string(),
            };
        }

        if let Some(status) = err.status() {
            return GatewayError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }

        GatewayError::Network {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }

    pub(crate) fn decode(endpoint: &str, detail: impl Into<String>) -> Self {
        GatewayError::Decode {
            endpoint: endpoint.to_string(),
            detail: detail.into(),
        }
    }

    /// HTTP status of the failure; `Some(0)` when the gateway was unreachable
    /// and `None` when the response arrived but could not be decoded.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Network { .. } => Some(0),
            GatewayError::Http { status, .. } => Some(*status),
            GatewayError::Decode { .. } => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, GatewayError::Network { .. })
    }
}
