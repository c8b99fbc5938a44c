use crate::link::EventSink;
use crate::transport::{MediaTransport, RemoteTrack, TrackKind, TransportConfig, TransportEvent};
use async_trait::async_trait;
use camlink_core::{Error, IceCandidate, Result, SessionDescription, TransportState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

/// webrtc-rs backed media transport for one connection attempt.
pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    closed: AtomicBool,
}

impl WebRtcTransport {
    /// Builds the peer connection and routes its callbacks into `events`.
    pub async fn new(config: &TransportConfig, events: EventSink<TransportEvent>) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs().map_err(engine_error)?;
        let registry =
            register_default_interceptors(Registry::new(), &mut media_engine).map_err(engine_error)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(engine_error)?,
        );

        let state_events = events.clone();
        peer_connection.on_ice_connection_state_change(Box::new(move |s: RTCIceConnectionState| {
            let events = state_events.clone();
            Box::pin(async move {
                info!(session = %events.session(), "ICE connection state changed: {}", s);
                if let Some(state) = map_ice_state(s) {
                    events.emit(TransportEvent::StateChanged(state));
                }
            })
        }));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else {
                    debug!("ICE gathering complete");
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => {
                        events.emit(TransportEvent::LocalCandidate(IceCandidate::new(
                            init.candidate,
                            init.sdp_mid,
                            init.sdp_mline_index,
                        )));
                    }
                    Err(e) => warn!("Failed to serialize local ICE candidate: {}", e),
                }
            })
        }));

        let track_events = events;
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let events = track_events.clone();
            Box::pin(async move {
                let Some(remote) = RemoteTrack::from_remote(track) else {
                    return;
                };
                info!(
                    session = %events.session(),
                    kind = %remote.kind(),
                    id = remote.id(),
                    "Remote track started"
                );
                if remote.kind() == TrackKind::Video {
                    events.emit(TransportEvent::RemoteTrack(remote));
                }
            })
        }));

        Ok(Self {
            peer_connection,
            closed: AtomicBool::new(false),
        })
    }

    async fn ensure_receive_transceivers(&self) -> Result<()> {
        if !self.peer_connection.get_transceivers().await.is_empty() {
            return Ok(());
        }
        for kind in [RTPCodecType::Video, RTPCodecType::Audio] {
            self.peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: vec![],
                    }),
                )
                .await
                .map_err(engine_error)?;
        }
        Ok(())
    }

    async fn apply_local(&self, description: RTCSessionDescription) -> Result<String> {
        let sdp = description.sdp.clone();
        self.peer_connection
            .set_local_description(description)
            .await
            .map_err(negotiation_error)?;
        Ok(sdp)
    }
}

#[async_trait]
impl MediaTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        self.ensure_receive_transceivers().await?;
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(negotiation_error)?;
        Ok(SessionDescription::offer(self.apply_local(offer).await?))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(negotiation_error)?;
        Ok(SessionDescription::answer(self.apply_local(answer).await?))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let remote = if description.is_offer() {
            RTCSessionDescription::offer(description.sdp)
        } else {
            RTCSessionDescription::answer(description.sdp)
        }
        .map_err(negotiation_error)?;

        self.peer_connection
            .set_remote_description(remote)
            .await
            .map_err(negotiation_error)
    }

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: Some(candidate.sdp_m_line_index.unwrap_or(0)),
            ..Default::default()
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(engine_error)
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let peer_connection = self.peer_connection.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = peer_connection.close().await {
                        warn!("Failed to close peer connection: {}", e);
                    }
                });
            }
            Err(_) => warn!("No runtime to close the peer connection on"),
        }
    }
}

impl Drop for WebRtcTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn map_ice_state(state: RTCIceConnectionState) -> Option<TransportState> {
    match state {
        RTCIceConnectionState::New => Some(TransportState::New),
        RTCIceConnectionState::Checking => Some(TransportState::Connecting),
        RTCIceConnectionState::Connected => Some(TransportState::Connected),
        RTCIceConnectionState::Completed => Some(TransportState::Completed),
        RTCIceConnectionState::Failed => Some(TransportState::Failed),
        RTCIceConnectionState::Disconnected => Some(TransportState::Disconnected),
        RTCIceConnectionState::Closed => Some(TransportState::Closed),
        _ => None,
    }
}

fn engine_error(e: webrtc::Error) -> Error {
    Error::Transport(e.to_string())
}

fn negotiation_error(e: webrtc::Error) -> Error {
    Error::Negotiation(e.to_string())
}
