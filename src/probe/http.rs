use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{header, Method};

use crate::{alert::AlertError, Alerter, DEFAULT_TIMEOUT, MAX_RESPONSE_BYTES};

use super::{
    client::{fresh_client, read_limited},
    Probe, ProbeError, ProbeOption, ProbeResult, Prober, Records,
};

const KIND: &str = "http";
const DEFAULT_NAME: &str = "WebProber";

/// Configuration an [`HttpOption`] mutates before the prober is built.
pub struct HttpOptions {
    name: Option<String>,
    desc: Option<String>,
    body: Option<String>,
    want_in_response: String,
    timeout: Duration,
    alerter: Option<Arc<dyn Alerter>>,
}

pub type HttpOption = Box<dyn FnOnce(&mut HttpOptions)>;

/// Sets the name, which ends up as `WebProber_<name>`.
pub fn name(name: impl Into<String>) -> HttpOption {
    let name = name.into();
    Box::new(move |o| o.name = Some(format!("{}_{}", DEFAULT_NAME, name)))
}

pub fn desc(desc: impl Into<String>) -> HttpOption {
    let desc = desc.into();
    Box::new(move |o| o.desc = Some(desc))
}

/// Sets the request body sent with every check.
pub fn body(body: impl Into<String>) -> HttpOption {
    let body = body.into();
    Box::new(move |o| o.body = Some(body))
}

/// Requires the response body to contain `s`.
pub fn in_response(s: impl Into<String>) -> HttpOption {
    let s = s.into();
    Box::new(move |o| o.want_in_response = s)
}

pub fn timeout(timeout: Duration) -> HttpOption {
    Box::new(move |o| o.timeout = timeout)
}

/// Routes alerts somewhere other than the alerter given to [`HttpProber::new`].
pub fn alert_with(alerter: Arc<dyn Alerter>) -> HttpOption {
    Box::new(move |o| o.alerter = Some(alerter))
}

/// Probes a target's HTTP response.
pub struct HttpProber {
    target: String,
    method: String,
    name: String,
    desc: String,
    body: Option<String>,
    want_code: u16,
    want_in_response: String,
    timeout: Duration,
    alerter: Arc<dyn Alerter>,
}

impl HttpProber {
    pub fn new(
        target: impl Into<String>,
        method: impl Into<String>,
        code: u16,
        alerter: Arc<dyn Alerter>,
        options: impl IntoIterator<Item = HttpOption>,
    ) -> Self {
        let target = target.into();
        let method = method.into();

        let mut o = HttpOptions {
            name: None,
            desc: None,
            body: None,
            want_in_response: String::new(),
            timeout: DEFAULT_TIMEOUT,
            alerter: None,
        };
        for opt in options {
            opt(&mut o);
        }

        let name = o
            .name
            .unwrap_or_else(|| format!("{}_{:?}_{}_{}", DEFAULT_NAME, target, method, code));
        let desc = o
            .desc
            .unwrap_or_else(|| format!("Probes HTTP response of {}", target));

        Self {
            target,
            method,
            name,
            desc,
            body: o.body,
            want_code: code,
            want_in_response: o.want_in_response,
            timeout: o.timeout,
            alerter: o.alerter.unwrap_or(alerter),
        }
    }

    /// Builds the prober and registers it as a [`Probe`] with the given
    /// scheduling options.
    pub fn new_with_generic(
        target: impl Into<String>,
        method: impl Into<String>,
        code: u16,
        alerter: Arc<dyn Alerter>,
        generic: impl IntoIterator<Item = ProbeOption>,
        options: impl IntoIterator<Item = HttpOption>,
    ) -> Probe {
        let p = Self::new(target, method, code, alerter, options);
        let (name, desc) = (p.name.clone(), p.desc.clone());
        Probe::new(Arc::new(p), name, desc, generic)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check(&self) -> Result<(), ProbeError> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|e| ProbeError::Request(format!("invalid method {:?}: {}", self.method, e)))?;
        let client = fresh_client(self.timeout)?;

        // Ask the peer to close the connection once the response is done.
        let mut request = client
            .request(method, &self.target)
            .header(header::CONNECTION, "close");
        if let Some(body) = &self.body {
            request = request.body(body.clone());
        }
        let request = request.build().map_err(ProbeError::Build)?;

        let response = client
            .execute(request)
            .await
            .map_err(|source| ProbeError::Transport {
                target: self.target.clone(),
                source,
            })?;

        let got = response.status().as_u16();
        if got != self.want_code {
            return Err(ProbeError::Status {
                want: self.want_code,
                got,
            });
        }

        let body = read_limited(response, MAX_RESPONSE_BYTES).await?;
        let body = String::from_utf8_lossy(&body);
        if !body.contains(self.want_in_response.as_str()) {
            return Err(ProbeError::Content {
                want: self.want_in_response.clone(),
                body: body.into_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for HttpProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} {}, want {}",
            self.name, self.desc, self.method, self.target, self.want_code
        )?;
        if !self.want_in_response.is_empty() {
            write!(f, " containing {:?}", self.want_in_response)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for HttpProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpProber")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("name", &self.name)
            .field("want_code", &self.want_code)
            .field("want_in_response", &self.want_in_response)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Prober for HttpProber {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.desc
    }

    async fn probe(&self) -> ProbeResult {
        match self.check().await {
            Ok(()) => ProbeResult::passed(),
            Err(err) => ProbeResult::failed_with(err.diagnostic()),
        }
    }

    async fn alert(
        &self,
        name: &str,
        desc: &str,
        badness: u32,
        records: &Records,
    ) -> Result<(), AlertError> {
        self.alerter.alert(name, desc, badness, records).await
    }
}
