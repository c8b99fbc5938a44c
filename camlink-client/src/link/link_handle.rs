use crate::link::{LinkCommand, LinkSnapshot};
use camlink_core::ConnectionState;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

/// Cloneable front door to a running [`LinkManager`](crate::link::LinkManager).
///
/// Operations only enqueue a command and return immediately; their effect is
/// visible through [`subscribe`](Self::subscribe).
#[derive(Debug, Clone)]
pub struct LinkHandle {
    commands: mpsc::UnboundedSender<LinkCommand>,
    snapshot: watch::Receiver<LinkSnapshot>,
}

impl LinkHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<LinkCommand>,
        snapshot: watch::Receiver<LinkSnapshot>,
    ) -> Self {
        Self { commands, snapshot }
    }

    pub fn start_observing(&self) {
        self.send(LinkCommand::StartObserving);
    }

    pub fn stop_observing(&self) {
        self.send(LinkCommand::StopObserving);
    }

    pub fn connect(&self) {
        self.send(LinkCommand::Connect);
    }

    pub fn disconnect(&self) {
        self.send(LinkCommand::Disconnect);
    }

    pub fn enter_background(&self) {
        self.send(LinkCommand::EnterBackground);
    }

    pub fn enter_foreground(&self) {
        self.send(LinkCommand::EnterForeground);
    }

    /// Change-notifying view of the link.
    pub fn subscribe(&self) -> watch::Receiver<LinkSnapshot> {
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.snapshot.borrow().state
    }

    /// Waits until a published snapshot satisfies `predicate`.
    ///
    /// Returns `None` if the manager stopped first.
    pub async fn wait_until<F>(&self, mut predicate: F) -> Option<LinkSnapshot>
    where
        F: FnMut(&LinkSnapshot) -> bool,
    {
        let mut rx = self.snapshot.clone();
        rx.wait_for(|s| predicate(s)).await.ok().map(|s| (*s).clone())
    }

    /// Disconnects and stops the manager. Resolves once everything is torn down.
    pub async fn shutdown(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(LinkCommand::Shutdown { done }).is_err() {
            return;
        }
        let _ = wait.await;
    }

    fn send(&self, cmd: LinkCommand) {
        if let Err(e) = self.commands.send(cmd) {
            warn!("Link manager is gone, dropping {:?}", e.0);
        }
    }
}
