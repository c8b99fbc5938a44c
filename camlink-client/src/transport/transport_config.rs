use camlink_core::{IceServerConfig, LinkConfig};
use camlink_core::config::DEFAULT_STUN_ADDR;

/// Configuration handed to the media transport engine.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
        }
    }
}

impl From<&LinkConfig> for TransportConfig {
    fn from(config: &LinkConfig) -> Self {
        Self {
            ice_servers: config.ice_servers.clone(),
        }
    }
}
