use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_TIMEOUT;

pub const DEFAULT_SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/api/mail.send.json";

/// Where alert emails go and how they get there.
///
/// Loaded once at startup and handed to an [`EmailAlerter`](super::EmailAlerter),
/// which only ever reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AlertConfig {
    /// From: address of alert emails.
    #[serde(default)]
    pub sender: String,
    /// To: address of alert emails.
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub ccs: Vec<String>,
    #[serde(default)]
    pub sendgrid: SendGridConfig,
}

#[derive(Clone, Serialize, Deserialize, JsonSchema)]
pub struct SendGridConfig {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Duration,
}

fn default_endpoint() -> String {
    DEFAULT_SENDGRID_ENDPOINT.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            user: Default::default(),
            password: Default::default(),
            endpoint: default_endpoint(),
            timeout: default_timeout(),
        }
    }
}

impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}
