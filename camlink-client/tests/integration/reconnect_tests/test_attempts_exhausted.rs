use std::sync::atomic::Ordering;
use std::time::Duration;

use camlink_core::{ConnectionState, FailureReason, LinkConfig};

use crate::integration::{create_test_link, init_tracing};
use crate::utils::{AutoConnect, MockSessionConfig, assert_no_session, wait_for_state};

#[tokio::test(start_paused = true)]
async fn test_link_stays_failed_after_max_attempts() {
    init_tracing();

    let config = LinkConfig::default().with_max_reconnect_attempts(Some(2));
    let (handle, mut sessions, transport_attempts) = create_test_link(
        MockSessionConfig {
            auto_connect: AutoConnect::Refuse,
            ..Default::default()
        },
        config,
    );

    handle.start_observing();
    for _ in 0..3 {
        sessions.recv().await.expect("session opened");
    }

    let snapshot = wait_for_state(&handle, ConnectionState::Failed).await.unwrap();
    assert_eq!(snapshot.error, Some(FailureReason::ConnectionLost));
    assert_no_session(&mut sessions, Duration::from_secs(600)).await;
    assert_eq!(transport_attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transport_creation_failure_fails_link() {
    init_tracing();

    let config = LinkConfig::default().with_max_reconnect_attempts(Some(1));
    let (handle, mut sessions, transport_attempts) = create_test_link(
        MockSessionConfig {
            fail_transport_creation: true,
            ..Default::default()
        },
        config,
    );

    handle.start_observing();

    let snapshot = wait_for_state(&handle, ConnectionState::Failed).await.unwrap();
    assert_eq!(snapshot.error, Some(FailureReason::ConnectionFailed));
    assert_eq!(transport_attempts.load(Ordering::SeqCst), 2);
    assert_no_session(&mut sessions, Duration::from_secs(60)).await;
}
