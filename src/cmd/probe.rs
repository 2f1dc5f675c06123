use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    conf::Conf,
    failure_penalty, interval,
    probe::{http, vars},
    Alerter, HttpProber, Probe, ProbeOption, ProbeResult, Record, VarsProber,
};

/// Builds a [`Probe`] for every configured check, filling unset values from
/// the global settings.
pub fn config_probes(c: &Conf, alerter: Arc<dyn Alerter>) -> Vec<Probe> {
    let gs = &c.settings.probe;
    let mut probes = Vec::with_capacity(c.http.len() + c.vars.len());

    for h in &c.http {
        let mut options = vec![http::timeout(gs.normalize_timeout(h.timeout))];
        if let Some(name) = &h.name {
            options.push(http::name(name.clone()));
        }
        if let Some(desc) = &h.desc {
            options.push(http::desc(desc.clone()));
        }
        if let Some(body) = &h.body {
            options.push(http::body(body.clone()));
        }
        options.push(http::in_response(h.contains.clone()));

        let generic: Vec<ProbeOption> = vec![
            interval(gs.normalize_interval(h.interval)),
            failure_penalty(gs.normalize_failure_penalty(h.failure_penalty)),
        ];
        probes.push(HttpProber::new_with_generic(
            h.url.clone(),
            h.method.clone(),
            h.code,
            Arc::clone(&alerter),
            generic,
            options,
        ));
    }

    for v in &c.vars {
        let mut options = vec![
            vars::timeout(gs.normalize_timeout(v.timeout)),
            vars::key(v.key.clone()),
            vars::want_value(v.value.clone()),
        ];
        if let Some(name) = &v.name {
            options.push(vars::name(name.clone()));
        }
        if let Some(desc) = &v.desc {
            options.push(vars::desc(desc.clone()));
        }

        // Only override the vars defaults with values set explicitly.
        let mut generic: Vec<ProbeOption> = vec![];
        if !v.interval.is_zero() {
            generic.push(interval(v.interval));
        }
        if v.failure_penalty > 0 {
            generic.push(failure_penalty(v.failure_penalty));
        }
        probes.push(VarsProber::new_with_generic(
            v.url.clone(),
            Arc::clone(&alerter),
            generic,
            options,
        ));
    }

    probes
}

/// Checks every probe once, concurrently, alerting on each failure.
/// Returns the number of failed probes.
pub async fn run_probes(probes: Vec<Probe>) -> usize {
    let mut set = JoinSet::new();
    for probe in probes {
        set.spawn(async move {
            let res = probe.check().await;
            if let ProbeResult::Failed { .. } = &res {
                let badness = probe.hints().failure_penalty;
                let records = vec![Record::now(res.clone())];
                if let Err(err) = probe.alert(badness, &records).await {
                    log::error!(
                        "[{} / {}] - failed to send alert: {}",
                        probe.prober().kind(),
                        probe.name(),
                        err
                    );
                }
            }
            res
        });
    }

    let mut failed = 0;
    while let Some(res) = set.join_next().await {
        match res {
            Ok(res) if res.is_passed() => {}
            Ok(_) => failed += 1,
            Err(err) => {
                log::error!("probe task panicked: {}", err);
                failed += 1;
            }
        }
    }
    failed
}
