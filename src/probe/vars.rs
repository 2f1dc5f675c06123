use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use crate::{alert::AlertError, Alerter, DEFAULT_TIMEOUT, MAX_RESPONSE_BYTES};

use super::{
    client::{fresh_client, read_limited},
    Probe, ProbeError, ProbeHints, ProbeOption, ProbeResult, Prober, Records,
};

const KIND: &str = "vars";

/// Vars pages change slowly, so they are checked less often than the
/// global default and count for more when they fail.
pub const VARS_HINTS: ProbeHints = ProbeHints {
    interval: Duration::from_secs(5 * 60),
    failure_penalty: 5,
};

pub struct VarsOptions {
    name: Option<String>,
    desc: Option<String>,
    key: String,
    want_value: String,
    timeout: Duration,
    alerter: Option<Arc<dyn Alerter>>,
}

pub type VarsOption = Box<dyn FnOnce(&mut VarsOptions)>;

pub fn name(name: impl Into<String>) -> VarsOption {
    let name = name.into();
    Box::new(move |o| o.name = Some(name))
}

pub fn desc(desc: impl Into<String>) -> VarsOption {
    let desc = desc.into();
    Box::new(move |o| o.desc = Some(desc))
}

/// The variable to look up. Dots address nested objects.
pub fn key(key: impl Into<String>) -> VarsOption {
    let key = key.into();
    Box::new(move |o| o.key = key)
}

pub fn want_value(value: impl Into<String>) -> VarsOption {
    let value = value.into();
    Box::new(move |o| o.want_value = value)
}

pub fn timeout(timeout: Duration) -> VarsOption {
    Box::new(move |o| o.timeout = timeout)
}

/// Sets a custom alerter, replacing the one given to [`VarsProber::new`].
pub fn alert_with(alerter: Arc<dyn Alerter>) -> VarsOption {
    Box::new(move |o| o.alerter = Some(alerter))
}

/// Probes a target host's vars page.
pub struct VarsProber {
    target: String,
    key: String,
    want_value: String,
    name: String,
    desc: String,
    timeout: Duration,
    alerter: Arc<dyn Alerter>,
}

impl VarsProber {
    pub fn new(
        target: impl Into<String>,
        alerter: Arc<dyn Alerter>,
        options: impl IntoIterator<Item = VarsOption>,
    ) -> Self {
        let target = target.into();
        let mut o = VarsOptions {
            name: None,
            desc: None,
            key: String::new(),
            want_value: String::new(),
            timeout: DEFAULT_TIMEOUT,
            alerter: None,
        };
        for opt in options {
            opt(&mut o);
        }

        let name = o.name.unwrap_or_else(|| {
            format!("VarsProber_{:?}_{:?}_{:?}", target, o.key, o.want_value)
        });
        let desc = o.desc.unwrap_or_else(|| {
            format!(
                "Probes vars page of {} for key {}, value {}",
                target, o.key, o.want_value
            )
        });

        Self {
            target,
            key: o.key,
            want_value: o.want_value,
            name,
            desc,
            timeout: o.timeout,
            alerter: o.alerter.unwrap_or(alerter),
        }
    }

    /// Builds the prober and registers it as a [`Probe`], starting from
    /// [`VARS_HINTS`]; `generic` options override those.
    pub fn new_with_generic(
        target: impl Into<String>,
        alerter: Arc<dyn Alerter>,
        generic: impl IntoIterator<Item = ProbeOption>,
        options: impl IntoIterator<Item = VarsOption>,
    ) -> Probe {
        let p = Self::new(target, alerter, options);
        let (name, desc) = (p.name.clone(), p.desc.clone());
        Probe::with_hints(Arc::new(p), name, desc, VARS_HINTS, generic)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn check(&self) -> Result<(), ProbeError> {
        let client = fresh_client(self.timeout)?;
        let response =
            client
                .get(&self.target)
                .send()
                .await
                .map_err(|source| ProbeError::Transport {
                    target: self.target.clone(),
                    source,
                })?;
        let body = read_limited(response, MAX_RESPONSE_BYTES).await?;
        log::debug!(
            "[{} / {}] - {} got response {:?}",
            KIND,
            self.name,
            self.target,
            String::from_utf8_lossy(&body)
        );

        if self.key.is_empty() {
            return Ok(());
        }

        let vars: Value = serde_json::from_slice(&body).map_err(|source| ProbeError::Parse {
            target: self.target.clone(),
            source,
        })?;
        let got = lookup(&vars, &self.key).ok_or_else(|| ProbeError::MissingKey {
            target: self.target.clone(),
            key: self.key.clone(),
        })?;
        let got = match got {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if got != self.want_value {
            return Err(ProbeError::Value {
                key: self.key.clone(),
                want: self.want_value.clone(),
                got,
            });
        }
        Ok(())
    }
}

/// Finds `key` in `vars`, first as a literal top-level key, then as a
/// dotted path.
fn lookup<'a>(vars: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(v) = vars.get(key) {
        return Some(v);
    }
    key.split('.').try_fold(vars, |v, part| v.get(part))
}

impl fmt::Display for VarsProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}={})",
            self.name, self.desc, self.key, self.want_value
        )
    }
}

impl fmt::Debug for VarsProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarsProber")
            .field("target", &self.target)
            .field("key", &self.key)
            .field("want_value", &self.want_value)
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Prober for VarsProber {
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
            Ok(()) => ProbeResult::passed_with(self.to_string(), self.target.clone()),
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

#[cfg(test)]
mod tests {
    use tokio::sync::Mutex;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{probe::client::serve_truncated_body, LogAlerter};

    const VARS: &str = r#"{"build":"v1.2","uptime":42,"memstats":{"NumGC":7},"a.b":"literal"}"#;

    fn log_alerter() -> Arc<dyn Alerter> {
        Arc::new(LogAlerter::default())
    }

    async fn serve(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    async fn probe_key(server: &MockServer, k: &str, v: &str) -> ProbeResult {
        VarsProber::new(server.uri(), log_alerter(), [key(k), want_value(v)])
            .probe()
            .await
    }

    #[tokio::test]
    async fn test_vars_match() {
        let server = serve(VARS).await;
        let res = probe_key(&server, "build", "v1.2").await;
        match res {
            ProbeResult::Passed { info, target } => {
                assert_eq!(target.as_deref(), Some(server.uri().as_str()));
                assert!(info.unwrap().ends_with("(build=v1.2)"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(probe_key(&server, "uptime", "42").await.is_passed());
        assert!(probe_key(&server, "memstats.NumGC", "7").await.is_passed());
        assert!(probe_key(&server, "a.b", "literal").await.is_passed());
    }

    #[tokio::test]
    async fn test_vars_mismatch() {
        let server = serve(VARS).await;

        let res = probe_key(&server, "build", "v2").await;
        let err = res.error().unwrap();
        assert!(err.contains(r#"want "v2", got "v1.2""#), "{}", err);

        let res = probe_key(&server, "nope", "x").await;
        assert!(res.error().unwrap().contains("key \"nope\" not found"));
    }

    #[tokio::test]
    async fn test_vars_bad_payload() {
        let server = serve("not json").await;
        let res = probe_key(&server, "build", "v1").await;
        let err = res.error().unwrap();
        assert!(err.starts_with("failed to parse vars page"), "{}", err);
        assert!(err.contains("expected"), "{}", err);

        // Without a key only the fetch is checked.
        let p = VarsProber::new(server.uri(), log_alerter(), []);
        assert!(p.probe().await.is_passed());
    }

    #[tokio::test]
    async fn test_vars_unreachable() {
        let p = VarsProber::new(
            "http://127.0.0.1:1/debug/vars",
            log_alerter(),
            [key("k"), timeout(Duration::from_secs(2))],
        );
        let err = p.probe().await.error().unwrap().to_string();
        assert!(err.starts_with("failed to send HTTP request"), "{}", err);
        assert!(err.to_lowercase().contains("refused"), "{}", err);
    }

    #[tokio::test]
    async fn test_vars_short_body() {
        let url = serve_truncated_body().await;
        let p = VarsProber::new(url.clone(), log_alerter(), [key("build")]);
        assert_eq!(p.target(), url);
        assert_eq!(p.key(), "build");

        let err = p.probe().await.error().unwrap().to_string();
        assert!(err.starts_with("failed to read HTTP response: "), "{}", err);
    }

    #[test]
    fn test_vars_defaults() {
        let p = VarsProber::new("http://h/debug/vars", log_alerter(), [key("k"), want_value("v")]);
        assert_eq!(p.name(), r#"VarsProber_"http://h/debug/vars"_"k"_"v""#);
        assert_eq!(
            p.description(),
            "Probes vars page of http://h/debug/vars for key k, value v"
        );

        // Fields that would collide under naive joining stay apart.
        let a = VarsProber::new("t", log_alerter(), [key("a_b"), want_value("c")]);
        let b = VarsProber::new("t", log_alerter(), [key("a"), want_value("b_c")]);
        assert_ne!(a.name(), b.name());

        let p = VarsProber::new(
            "t",
            log_alerter(),
            [name("one"), key("k"), name("two"), desc("d")],
        );
        assert_eq!(p.name(), "two");
        assert_eq!(p.to_string(), "two: d (k=)");
    }

    #[test]
    fn test_vars_generic() {
        let p = VarsProber::new_with_generic("t", log_alerter(), [], []);
        assert_eq!(*p.hints(), VARS_HINTS);

        let p = VarsProber::new_with_generic(
            "t",
            log_alerter(),
            [crate::interval(Duration::from_secs(1))],
            [],
        );
        assert_eq!(p.hints().interval, Duration::from_secs(1));
        assert_eq!(p.hints().failure_penalty, 5);
    }

    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl Alerter for Recorder {
        async fn alert(
            &self,
            name: &str,
            _desc: &str,
            badness: u32,
            _records: &Records,
        ) -> Result<(), AlertError> {
            self.0.lock().await.push(format!("{}:{}", name, badness));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_vars_custom_alert() {
        let recorder = Arc::new(Recorder(Mutex::new(vec![])));
        let p = VarsProber::new("t", log_alerter(), [alert_with(recorder.clone())]);
        p.alert("n", "d", 5, &vec![]).await.unwrap();
        assert_eq!(*recorder.0.lock().await, vec!["n:5".to_string()]);
    }
}
