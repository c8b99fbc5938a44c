use camlink_client::SignalingEvent;
use camlink_core::{ConnectionState, FailureReason, LinkConfig, SessionDescription};

use crate::integration::{TEST_OFFER_SDP, create_test_link, init_tracing};
use crate::utils::{
    MockSessionConfig, MockTransportBehavior, SentSignal, TransportCall, next_sent, next_session,
    wait_for_state,
};

#[tokio::test(start_paused = true)]
async fn test_rejected_offer_fails_link_and_schedules_retry() {
    init_tracing();

    let (handle, mut sessions, _) = create_test_link(
        MockSessionConfig {
            transport: MockTransportBehavior {
                reject_remote_description: true,
                ..Default::default()
            },
            ..Default::default()
        },
        LinkConfig::default(),
    );

    handle.start_observing();
    let mut session = next_session(&mut sessions).await.unwrap();
    assert_eq!(next_sent(&mut session).await.unwrap(), SentSignal::Ready);

    session.signal(SignalingEvent::RemoteDescription(SessionDescription::offer(
        TEST_OFFER_SDP,
    )));

    let snapshot = wait_for_state(&handle, ConnectionState::Reconnecting).await.unwrap();
    assert_eq!(snapshot.error, Some(FailureReason::ConnectionFailed));
    assert_eq!(session.transport.close_count(), 1);
    assert_eq!(session.signaling.disconnect_count(), 1);

    // No answer is produced for a rejected offer.
    assert_eq!(
        session.transport.calls(),
        vec![TransportCall::SetRemote(SessionDescription::offer(TEST_OFFER_SDP))]
    );
    assert_eq!(session.signaling.signals(), vec![SentSignal::Ready]);

    let retry = next_session(&mut sessions).await.unwrap();
    assert_ne!(retry.id, session.id);
}
