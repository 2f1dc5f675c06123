use std::sync::Arc;

use crate::{AlertConfig, Alerter, EmailAlerter, LogAlerter};

/// Email when mail settings exist and this is not a dry run, log otherwise.
pub fn config_alerter(conf: Option<AlertConfig>, dry: bool) -> Arc<dyn Alerter> {
    match conf {
        Some(conf) if !dry => {
            log::info!(
                "Notification [email] - alerts go to {} via {}",
                conf.recipient,
                conf.sendgrid.endpoint
            );
            Arc::new(EmailAlerter::with_default_templates(conf))
        }
        _ => {
            log::info!("Notification [log] is running on Dry mode!");
            Arc::new(LogAlerter::default())
        }
    }
}
