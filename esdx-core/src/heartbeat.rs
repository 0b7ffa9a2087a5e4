//! Background observer: append-only channel from engine to a logging task,
//! replacing the original global-mutable-state polling thread.

use tokio::sync::mpsc;
use tracing::info;

use crate::types::ResolvedName;

pub struct Heartbeat {
    sender: mpsc::UnboundedSender<ResolvedName>,
}

impl Heartbeat {
    /// Spawn the observer task and return a handle for the engine to push
    /// admissions into. The task exits when the sender is dropped.
    pub fn spawn(apex: String) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ResolvedName>();
        let handle = tokio::spawn(async move {
            let mut count = 0usize;
            while let Some(resolved) = rx.recv().await {
                count += 1;
                info!(
                    "[{apex}] admitted #{count}: {} -> {:?}",
                    resolved.fqdn, resolved.ips
                );
            }
            info!("[{apex}] heartbeat finished, {count} total admissions");
        });
        (Self { sender: tx }, handle)
    }

    pub fn notify(&self, resolved: ResolvedName) {
        let _ = self.sender.send(resolved);
    }
}
