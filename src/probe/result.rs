use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single probe invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    Passed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        info: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl ProbeResult {
    pub fn passed() -> Self {
        Self::Passed {
            info: None,
            target: None,
        }
    }

    pub fn passed_with(info: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Passed {
            info: Some(info.into()),
            target: Some(target.into()),
        }
    }

    pub fn failed_with(err: impl Display) -> Self {
        Self::Failed {
            error: err.to_string(),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// The failure diagnostic, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Passed { .. } => None,
        }
    }
}

impl Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed { info: None, .. } => write!(f, "passed"),
            Self::Passed {
                info: Some(info), ..
            } => write!(f, "passed: {}", info),
            Self::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

/// One historical probe outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub result: ProbeResult,
}

impl Record {
    pub fn now(result: ProbeResult) -> Self {
        Self {
            timestamp: Utc::now(),
            result,
        }
    }
}

/// Ordered history handed through to alerting untouched.
pub type Records = Vec<Record>;
