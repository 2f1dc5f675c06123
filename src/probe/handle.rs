use std::{sync::Arc, time::Duration};

use crate::{alert::AlertError, DEFAULT_FAILURE_PENALTY, DEFAULT_PROBE_INTERVAL};

use super::{ProbeResult, Prober, Records};

/// Scheduling hints a runner reads off a [`Probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeHints {
    pub interval: Duration,
    pub failure_penalty: u32,
}

impl Default for ProbeHints {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PROBE_INTERVAL,
            failure_penalty: DEFAULT_FAILURE_PENALTY,
        }
    }
}

pub type ProbeOption = Box<dyn FnOnce(&mut ProbeHints)>;

/// How often the runner should check the probe.
pub fn interval(interval: Duration) -> ProbeOption {
    Box::new(move |h| h.interval = interval)
}

/// How much badness one failed check adds.
pub fn failure_penalty(penalty: u32) -> ProbeOption {
    Box::new(move |h| h.failure_penalty = penalty)
}

/// A prober registered under a display name, as driven by a runner.
#[derive(Clone)]
pub struct Probe {
    prober: Arc<dyn Prober>,
    name: String,
    desc: String,
    hints: ProbeHints,
}

impl Probe {
    pub fn new(
        prober: Arc<dyn Prober>,
        name: impl Into<String>,
        desc: impl Into<String>,
        options: impl IntoIterator<Item = ProbeOption>,
    ) -> Self {
        Self::with_hints(prober, name, desc, ProbeHints::default(), options)
    }

    /// Like [`Probe::new`], starting from kind-specific hints instead of the
    /// global defaults. Options still override them.
    pub fn with_hints(
        prober: Arc<dyn Prober>,
        name: impl Into<String>,
        desc: impl Into<String>,
        mut hints: ProbeHints,
        options: impl IntoIterator<Item = ProbeOption>,
    ) -> Self {
        for opt in options {
            opt(&mut hints);
        }
        Self {
            prober,
            name: name.into(),
            desc: desc.into(),
            hints,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn hints(&self) -> &ProbeHints {
        &self.hints
    }

    pub fn prober(&self) -> &Arc<dyn Prober> {
        &self.prober
    }

    pub async fn check(&self) -> ProbeResult {
        let res = self.prober.probe().await;
        match &res {
            ProbeResult::Passed { .. } => {
                log::debug!("[{} / {}] - passed", self.prober.kind(), self.name)
            }
            ProbeResult::Failed { error } => {
                log::warn!("[{} / {}] - failed: {}", self.prober.kind(), self.name, error)
            }
        }
        res
    }

    pub async fn alert(&self, badness: u32, records: &Records) -> Result<(), AlertError> {
        self.prober
            .alert(&self.name, &self.desc, badness, records)
            .await
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("kind", &self.prober.kind())
            .field("name", &self.name)
            .field("desc", &self.desc)
            .field("hints", &self.hints)
            .finish()
    }
}
