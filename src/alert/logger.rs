use std::sync::Arc;

use async_trait::async_trait;

use crate::Records;

use super::{AlertData, AlertError, Alerter, HtmlTemplates, Templates, EMAIL_SECTION};

const KIND: &str = "log";

/// Writes alerts to the log instead of sending them. Used for dry runs and
/// when no mail settings are configured.
pub struct LogAlerter {
    templates: Arc<dyn Templates>,
}

impl LogAlerter {
    pub fn new(templates: Arc<dyn Templates>) -> Self {
        Self { templates }
    }
}

impl Default for LogAlerter {
    fn default() -> Self {
        Self::new(Arc::new(HtmlTemplates))
    }
}

#[async_trait]
impl Alerter for LogAlerter {
    async fn alert(
        &self,
        name: &str,
        desc: &str,
        badness: u32,
        records: &Records,
    ) -> Result<(), AlertError> {
        let data = AlertData {
            name,
            desc,
            badness,
            records,
        };
        let html = self.templates.render(EMAIL_SECTION, &data)?;
        log::info!(
            "[{} / {}] - {} failed (badness {})\n{}",
            KIND,
            name,
            name,
            badness,
            html
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_alert() {
        LogAlerter::default()
            .alert("web", "desc", 2, &vec![])
            .await
            .unwrap();
    }
}
