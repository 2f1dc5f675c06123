use std::sync::Arc;

use async_trait::async_trait;

use crate::Records;

use super::{
    AlertConfig, AlertData, AlertError, Alerter, HtmlTemplates, Mail, SendGridClient, Templates,
    EMAIL_SECTION,
};

const KIND: &str = "email";

/// Sends alerts as HTML email through SendGrid.
pub struct EmailAlerter {
    config: AlertConfig,
    templates: Arc<dyn Templates>,
}

impl EmailAlerter {
    pub fn new(config: AlertConfig, templates: Arc<dyn Templates>) -> Self {
        Self { config, templates }
    }

    /// Uses the templates compiled into the crate.
    pub fn with_default_templates(config: AlertConfig) -> Self {
        Self::new(config, Arc::new(HtmlTemplates))
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}

#[async_trait]
impl Alerter for EmailAlerter {
    async fn alert(
        &self,
        name: &str,
        desc: &str,
        badness: u32,
        records: &Records,
    ) -> Result<(), AlertError> {
        log::debug!("[{} / {}] - sending alert email..", KIND, name);

        let data = AlertData {
            name,
            desc,
            badness,
            records,
        };
        let html = self.templates.render(EMAIL_SECTION, &data)?;

        let conf = &self.config;
        let subject = format!("{} failed (badness {})", name, badness);
        let mail = Mail::new(subject, html, &conf.sender, &conf.recipient, &conf.ccs)?;

        let client = SendGridClient::new(&conf.sendgrid)?;
        client.send(&mail).await?;

        log::info!(
            "[{} / {}] - sent alert email to {}",
            KIND,
            name,
            conf.recipient
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{body_string_contains, method},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{ProbeResult, Record, SendGridConfig, TemplateError};

    async fn mail_server(expected: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"success"}"#))
            .expect(expected)
            .mount(&server)
            .await;
        server
    }

    fn config(server: &MockServer) -> AlertConfig {
        AlertConfig {
            sender: "probes@example.com".to_string(),
            recipient: "oncall@example.com".to_string(),
            ccs: vec!["team@example.com".to_string()],
            sendgrid: SendGridConfig {
                user: "u".to_string(),
                password: "p".to_string(),
                endpoint: server.uri(),
                ..Default::default()
            },
        }
    }

    fn records() -> Records {
        vec![Record::now(ProbeResult::failed_with("want 200, got 503"))]
    }

    #[tokio::test]
    async fn test_send_alert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("subject=web+failed+%28badness+3%29"))
            .and(body_string_contains("to%5B%5D=oncall%40example.com"))
            .and(body_string_contains("cc%5B%5D=team%40example.com"))
            .and(body_string_contains("from=probes%40example.com"))
            .and(body_string_contains("got+503"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"success"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let alerter = EmailAlerter::with_default_templates(config(&server));
        assert_eq!(alerter.config().recipient, "oncall@example.com");
        alerter.alert("web", "desc", 3, &records()).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_recipient() {
        let server = mail_server(0).await;
        let mut conf = config(&server);
        conf.recipient = String::new();

        let err = EmailAlerter::with_default_templates(conf)
            .alert("web", "desc", 1, &records())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertError::Address { field: "recipient", .. }));
    }

    #[tokio::test]
    async fn test_invalid_sender() {
        let server = mail_server(0).await;
        let mut conf = config(&server);
        conf.sender = "not-an-address".to_string();

        let err = EmailAlerter::with_default_templates(conf)
            .alert("web", "desc", 1, &records())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("\"not-an-address\""), "{}", err);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let server = mail_server(0).await;

        let mut conf = config(&server);
        conf.sendgrid.user = String::new();
        let err = EmailAlerter::with_default_templates(conf)
            .alert("web", "desc", 1, &records())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no sendgrid user"), "{}", err);

        let mut conf = config(&server);
        conf.sendgrid.password = String::new();
        let err = EmailAlerter::with_default_templates(conf)
            .alert("web", "desc", 1, &records())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no sendgrid password"), "{}", err);
    }

    struct Broken;

    impl Templates for Broken {
        fn render(&self, section: &str, _: &AlertData<'_>) -> Result<String, TemplateError> {
            Err(TemplateError::Missing(section.to_string()))
        }
    }

    #[tokio::test]
    async fn test_template_error() {
        let server = mail_server(0).await;
        let err = EmailAlerter::new(config(&server), Arc::new(Broken))
            .alert("web", "desc", 1, &records())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to construct email from template: no template named \"email\""
        );
    }

    #[tokio::test]
    async fn test_send_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;
        let err = EmailAlerter::with_default_templates(config(&server))
            .alert("web", "desc", 1, &records())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertError::Send { .. }));
    }
}
