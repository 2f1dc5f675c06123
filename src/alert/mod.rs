use async_trait::async_trait;
use thiserror::Error;

mod config;
pub use config::*;
mod email;
pub use email::*;
mod logger;
pub use logger::*;
mod sendgrid;
pub use sendgrid::*;
mod template;
pub use template::*;

use crate::Records;

/// Somewhere a failing probe can be reported to.
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn alert(
        &self,
        name: &str,
        desc: &str,
        badness: u32,
        records: &Records,
    ) -> Result<(), AlertError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    User,
    Password,
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::User => write!(f, "user"),
            Credential::Password => write!(f, "password"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("failed to construct email from template: {0}")]
    Template(#[from] TemplateError),
    #[error("invalid {field} address {address:?}: {reason}")]
    Address {
        field: &'static str,
        address: String,
        reason: &'static str,
    },
    #[error("failed to create mail client: no sendgrid {0} specified")]
    MissingCredential(Credential),
    #[error("failed to send mail to {recipient}: {reason}")]
    Send { recipient: String, reason: String },
}
