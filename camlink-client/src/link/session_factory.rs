use crate::link::EventSink;
use crate::signaling::{Heartbeat, SignalingChannel, SignalingClient, SignalingEvent};
use crate::transport::{MediaTransport, TransportConfig, TransportEvent, WebRtcTransport};
use async_trait::async_trait;
use camlink_core::{LinkConfig, Result};
use std::sync::Arc;

/// Builds the signaling client and media transport for one connection attempt.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    fn signaling(&self, events: EventSink<SignalingEvent>) -> Box<dyn SignalingChannel>;

    async fn transport(&self, events: EventSink<TransportEvent>) -> Result<Arc<dyn MediaTransport>>;
}

/// Production factory: tungstenite signaling plus a webrtc-rs transport.
#[derive(Debug, Clone)]
pub struct WebRtcSessionFactory {
    signaling_url: String,
    heartbeat: Heartbeat,
    transport: TransportConfig,
}

impl WebRtcSessionFactory {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            signaling_url: config.signaling_url.clone(),
            heartbeat: Heartbeat::new(config.heartbeat_interval, config.heartbeat_timeout),
            transport: TransportConfig::from(config),
        }
    }
}

#[async_trait]
impl SessionFactory for WebRtcSessionFactory {
    fn signaling(&self, events: EventSink<SignalingEvent>) -> Box<dyn SignalingChannel> {
        Box::new(SignalingClient::new(
            self.signaling_url.clone(),
            self.heartbeat,
            events,
        ))
    }

    async fn transport(&self, events: EventSink<TransportEvent>) -> Result<Arc<dyn MediaTransport>> {
        let transport = WebRtcTransport::new(&self.transport, events).await?;
        Ok(Arc::new(transport))
    }
}
