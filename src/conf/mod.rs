use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::{global::ProbeSettings, AlertConfig};

pub fn json_schema() -> Result<String> {
    let schema = schema_for!(Conf);
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// One HTTP probe.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HttpProbeConf {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_code")]
    pub code: u16,
    /// Text the response body must contain.
    #[serde(default)]
    pub contains: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Duration,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub interval: Duration,
    #[serde(default)]
    pub failure_penalty: u32,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_code() -> u16 {
    200
}

/// One vars page probe.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VarsProbeConf {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Duration,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub interval: Duration,
    #[serde(default)]
    pub failure_penalty: u32,
}

// Global Settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub probe: ProbeSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: default_name(),
            probe: Default::default(),
        }
    }
}

fn default_name() -> String {
    "probekit".to_string()
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Conf {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub http: Vec<HttpProbeConf>,
    #[serde(default)]
    pub vars: Vec<VarsProbeConf>,
    /// Mail settings. Without them alerts are only logged.
    #[serde(default)]
    pub alert: Option<AlertConfig>,
    #[serde(default)]
    pub settings: Settings,
}

impl Conf {
    pub fn from_yaml(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&s).with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
