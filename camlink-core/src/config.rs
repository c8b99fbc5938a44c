use crate::error::{Error, Result};
use crate::model::IceServerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Deployment the viewer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Debug builds talk to a local server, release builds to production.
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn signaling_url(self) -> &'static str {
        match self {
            Self::Development => "ws://localhost:8080/ws",
            Self::Production => "wss://api.elderguard.com/ws",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::InvalidConfig(format!("unknown environment '{other}'"))),
        }
    }
}

/// Settings for the shared camera link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub signaling_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    /// Cadence of liveness probes on the signaling channel.
    pub heartbeat_interval: Duration,
    /// Silence after which the signaling channel is presumed dead.
    pub heartbeat_timeout: Duration,
    pub max_reconnect_delay: Duration,
    /// `None` keeps retrying forever.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::for_environment(Environment::current())
    }
}

impl LinkConfig {
    pub fn for_environment(env: Environment) -> Self {
        Self {
            signaling_url: env.signaling_url().to_owned(),
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            max_reconnect_delay: DEFAULT_MAX_RECONNECT_DELAY,
            max_reconnect_attempts: None,
        }
    }

    pub fn with_signaling_url(mut self, url: impl Into<String>) -> Self {
        self.signaling_url = url.into();
        self
    }

    pub fn with_ice_servers(mut self, servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = servers;
        self
    }

    pub fn with_heartbeat(mut self, interval: Duration, timeout: Duration) -> Self {
        self.heartbeat_interval = interval;
        self.heartbeat_timeout = timeout;
        self
    }

    pub fn with_max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.signaling_url.starts_with("ws://") || self.signaling_url.starts_with("wss://")) {
            return Err(Error::InvalidConfig(format!(
                "signaling url must use ws:// or wss://, got '{}'",
                self.signaling_url
            )));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(Error::InvalidConfig("heartbeat interval must be non-zero".into()));
        }
        if self.heartbeat_timeout <= self.heartbeat_interval {
            return Err(Error::InvalidConfig(
                "heartbeat timeout must exceed the heartbeat interval".into(),
            ));
        }
        if self.max_reconnect_delay.is_zero() {
            return Err(Error::InvalidConfig("max reconnect delay must be non-zero".into()));
        }
        Ok(())
    }
}
