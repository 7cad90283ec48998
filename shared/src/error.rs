use thiserror::Error;

/// Failures talking to the backend. Application-level answers such as
/// "no subscription" or "not allowed" are not errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn path(&self) -> &str {
        match self {
            Self::Transport { path, .. } | Self::Decode { path, .. } => path,
        }
    }
}
