use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_LISTEN: &str = "127.0.0.1:42069";
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Upper bound on receiving one full request. Zero disables it.
    pub read_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN.to_string(),
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `HTTPFROMTCP_CONFIG`, then the
    /// `LISTEN` and `READ_TIMEOUT_SECS` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("HTTPFROMTCP_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                Self::from_yaml(&raw).with_context(|| format!("parsing config file {path}"))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.listen_addr = listen_addr;
        }
        if let Ok(secs) = std::env::var("READ_TIMEOUT_SECS") {
            cfg.read_timeout_secs = secs
                .parse()
                .with_context(|| format!("READ_TIMEOUT_SECS={secs:?} is not a number"))?;
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}
