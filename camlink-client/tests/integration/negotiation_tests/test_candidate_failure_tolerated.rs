use std::time::Duration;

use camlink_client::SignalingEvent;
use camlink_core::{ConnectionState, IceCandidate, LinkConfig};

use crate::integration::{create_test_link, establish_link, init_tracing};
use crate::utils::{
    MockSessionConfig, MockTransportBehavior, TransportCall, assert_no_session,
};

#[tokio::test(start_paused = true)]
async fn test_rejected_candidate_does_not_change_state() {
    init_tracing();

    let (handle, mut sessions, _) = create_test_link(
        MockSessionConfig {
            transport: MockTransportBehavior {
                reject_candidates: true,
                ..Default::default()
            },
            ..Default::default()
        },
        LinkConfig::default(),
    );
    let session = establish_link(&handle, &mut sessions).await;
    let before = handle.snapshot();

    for n in 0..3 {
        session.signal(SignalingEvent::RemoteCandidate(IceCandidate::new(
            format!("candidate:bad-{n}"),
            Some("0".into()),
            Some(0),
        )));
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    let rejected = session
        .transport
        .calls()
        .into_iter()
        .filter(|c| matches!(c, TransportCall::AddCandidate(_)))
        .count();
    assert_eq!(rejected, 3);

    assert_eq!(handle.snapshot(), before);
    assert_eq!(handle.state(), ConnectionState::Connected);
    assert_eq!(session.transport.close_count(), 0);
    assert_no_session(&mut sessions, Duration::from_secs(60)).await;
}
