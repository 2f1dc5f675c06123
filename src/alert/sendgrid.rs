use reqwest::Client;
use serde::Deserialize;

use super::{AlertError, Credential, SendGridConfig};

/// An outgoing alert email with validated addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    subject: String,
    html: String,
    from: String,
    to: String,
    ccs: Vec<String>,
}

impl Mail {
    pub fn new(
        subject: impl Into<String>,
        html: impl Into<String>,
        from: &str,
        to: &str,
        ccs: &[String],
    ) -> Result<Self, AlertError> {
        validate_address("recipient", to)?;
        for cc in ccs {
            validate_address("cc", cc)?;
        }
        validate_address("sender", from)?;

        Ok(Self {
            subject: subject.into(),
            html: html.into(),
            from: from.to_string(),
            to: to.to_string(),
            ccs: ccs.to_vec(),
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn ccs(&self) -> &[String] {
        &self.ccs
    }
}

/// Checks `address` is either `local@domain` or `Name <local@domain>`.
pub fn validate_address(field: &'static str, address: &str) -> Result<(), AlertError> {
    let bad = |reason| AlertError::Address {
        field,
        address: address.to_string(),
        reason,
    };

    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(bad("address is empty"));
    }
    let addr = match (trimmed.rfind('<'), trimmed.strip_suffix('>')) {
        (Some(start), Some(inner)) => &inner[start + 1..],
        (None, None) => trimmed,
        _ => return Err(bad("unbalanced angle brackets")),
    };

    let (local, domain) = addr.rsplit_once('@').ok_or_else(|| bad("missing @"))?;
    if local.is_empty() {
        return Err(bad("missing local part"));
    }
    if domain.is_empty() {
        return Err(bad("missing domain"));
    }
    if addr
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | ';'))
    {
        return Err(bad("invalid character"));
    }
    if domain.contains('@') || domain.split('.').any(str::is_empty) {
        return Err(bad("malformed domain"));
    }
    Ok(())
}

/// Renders `err` with all of its sources, which reqwest leaves out of `Display`.
fn cause_chain(err: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::new(err))
}

#[derive(Deserialize)]
struct Reply {
    message: String,
    #[serde(default)]
    errors: Vec<String>,
}

/// Client for the SendGrid web mail API.
pub struct SendGridClient {
    user: String,
    password: String,
    endpoint: String,
    client: Client,
}

impl SendGridClient {
    /// Fails without touching the network if a credential is missing.
    pub fn new(conf: &SendGridConfig) -> Result<Self, AlertError> {
        if conf.user.is_empty() {
            return Err(AlertError::MissingCredential(Credential::User));
        }
        if conf.password.is_empty() {
            return Err(AlertError::MissingCredential(Credential::Password));
        }
        let client = Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(|e| AlertError::Send {
                recipient: String::new(),
                reason: format!("failed to build HTTP client: {}", cause_chain(e)),
            })?;

        Ok(Self {
            user: conf.user.clone(),
            password: conf.password.clone(),
            endpoint: conf.endpoint.clone(),
            client,
        })
    }

    pub async fn send(&self, mail: &Mail) -> Result<(), AlertError> {
        let failed = |reason: String| AlertError::Send {
            recipient: mail.to.clone(),
            reason,
        };

        let mut form: Vec<(&str, &str)> = vec![
            ("api_user", self.user.as_str()),
            ("api_key", self.password.as_str()),
            ("to[]", mail.to.as_str()),
            ("subject", mail.subject.as_str()),
            ("html", mail.html.as_str()),
            ("from", mail.from.as_str()),
        ];
        for cc in &mail.ccs {
            form.push(("cc[]", cc.as_str()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| failed(cause_chain(e)))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| failed(cause_chain(e)))?;

        if !status.is_success() {
            return Err(failed(format!("{}: {}", status, text.trim())));
        }
        match serde_json::from_str::<Reply>(&text) {
            Ok(reply) if reply.message == "success" => Ok(()),
            Ok(reply) => Err(failed(format!(
                "{}: {}",
                reply.message,
                reply.errors.join("; ")
            ))),
            Err(e) => Err(failed(format!("unexpected reply {:?}: {}", text, e))),
        }
    }
}
