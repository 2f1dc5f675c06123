use thiserror::Error;

/// Reasons a single check can fail.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to create HTTP request: {0}")]
    Request(String),
    #[error("failed to create HTTP request")]
    Build(#[source] reqwest::Error),
    #[error("failed to send HTTP request to {target}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("bad HTTP response status; want {want}, got {got}")]
    Status { want: u16, got: u16 },
    #[error("failed to read HTTP response")]
    Read(#[source] reqwest::Error),
    #[error("response doesn't contain {want:?}: \n{body}\n")]
    Content { want: String, body: String },
    #[error("failed to parse vars page of {target}")]
    Parse {
        target: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("key {key:?} not found on vars page of {target}")]
    MissingKey { target: String, key: String },
    #[error("bad value for key {key:?}; want {want:?}, got {got:?}")]
    Value {
        key: String,
        want: String,
        got: String,
    },
}

impl ProbeError {
    /// The message followed by every underlying cause, e.g.
    /// `failed to send HTTP request to ..: error sending request ..: connection refused`.
    pub fn diagnostic(self) -> String {
        format!("{:#}", anyhow::Error::new(self))
    }
}
