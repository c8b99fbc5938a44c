use std::time::Duration;

use camlink_core::{ConnectionState, LinkConfig};

use crate::integration::{create_test_link, establish_link, init_tracing};
use crate::utils::{MockSessionConfig, assert_no_session};

#[tokio::test(start_paused = true)]
async fn test_last_observer_leaving_keeps_link_warm() {
    init_tracing();

    let (handle, mut sessions, _) =
        create_test_link(MockSessionConfig::default(), LinkConfig::default());
    let session = establish_link(&handle, &mut sessions).await;

    handle.stop_observing();
    // One more than attached; must not underflow or tear down.
    handle.stop_observing();
    tokio::time::sleep(Duration::from_secs(60)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.state, ConnectionState::Connected);
    assert!(snapshot.has_track());
    assert_eq!(session.signaling.disconnect_count(), 0);
    assert_eq!(session.transport.close_count(), 0);

    // Re-attaching to a live link reuses it.
    handle.start_observing();
    assert_no_session(&mut sessions, Duration::from_secs(1)).await;
    assert!(handle.snapshot().is_live());
}
