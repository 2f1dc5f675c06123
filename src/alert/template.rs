use askama::Template;
use thiserror::Error;

use crate::Record;

/// Section rendered into the body of alert emails.
pub const EMAIL_SECTION: &str = "email";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no template named {0:?}")]
    Missing(String),
    #[error(transparent)]
    Render(#[from] askama::Error),
}

/// Everything a template gets to see about a failing probe.
#[derive(Debug, Clone, Copy)]
pub struct AlertData<'a> {
    pub name: &'a str,
    pub desc: &'a str,
    pub badness: u32,
    pub records: &'a [Record],
}

/// A set of named HTML templates.
pub trait Templates: Send + Sync {
    fn render(&self, section: &str, data: &AlertData<'_>) -> Result<String, TemplateError>;
}

#[derive(Template)]
#[template(path = "email.html")]
struct EmailTemplate<'a> {
    name: &'a str,
    desc: &'a str,
    badness: u32,
    records: &'a [Record],
}

/// The templates compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTemplates;

impl Templates for HtmlTemplates {
    fn render(&self, section: &str, data: &AlertData<'_>) -> Result<String, TemplateError> {
        match section {
            EMAIL_SECTION => Ok(EmailTemplate {
                name: data.name,
                desc: data.desc,
                badness: data.badness,
                records: data.records,
            }
            .render()?),
            other => Err(TemplateError::Missing(other.to_string())),
        }
    }
}
