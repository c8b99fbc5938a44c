use tokio::sync::oneshot;

/// Operations marshalled onto the link manager task.
#[derive(Debug)]
pub enum LinkCommand {
    /// A consumer attached to the shared link.
    StartObserving,

    /// A consumer detached. The connection stays warm.
    StopObserving,

    Connect,

    /// Tear everything down and reset the reconnect schedule.
    Disconnect,

    EnterBackground,

    /// Re-validate the link after the application comes back.
    EnterForeground,

    /// Disconnect and stop the manager; acknowledged once torn down.
    Shutdown { done: oneshot::Sender<()> },
}
