//! Background worker
//!
//! The worker task owns the bound link, the debouncer and the sink. It
//! alternates between discovery and polling for as long as it runs:
//!
//! ```text
//!           ┌──────────── link lost ─────────────┐
//!           v                                    │
//!   Searching ── handshake ok ──> Bound(port) ───┘
//!       │  ^                         │
//!       └──┘ nothing found,          │ Docked / Undocked
//!            wait backoff            v
//!                                 Debouncer ──> DockSink
//! ```
//!
//! Every wait is raced against the command channel, so a shutdown request is
//! seen within one cycle. Dropping all handles closes the channel, which
//! also stops the worker.

use std::future::Future;

use dock_detect::{DockLink, HandshakeProber, PortConnector, PortEnumerator};
use dock_protocol::PollResponse;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::debounce::Debouncer;
use crate::discovery::discover_once;
use crate::poll::poll_once;
use crate::sink::DockSink;

/// Commands that can be sent to the worker task
#[derive(Debug)]
pub enum WorkerCommand {
    /// Close any open link and stop
    Shutdown,
}

/// Connection state of the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Looking for the holder
    Searching,
    /// Polling the holder on a port
    Bound {
        /// Port the holder answered on
        port: String,
    },
    /// Worker has exited
    Stopped,
}

/// Snapshot published by the worker for foreground readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerStatus {
    pub link: LinkState,
    /// Last confirmed docked state
    pub docked: bool,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self {
            link: LinkState::Searching,
            docked: false,
        }
    }
}

/// Discovery and polling loop
pub struct DockWorker<E, C, K> {
    enumerator: E,
    connector: C,
    sink: K,
    prober: HandshakeProber,
    config: WatchConfig,
    debouncer: Debouncer,
    status_tx: watch::Sender<WorkerStatus>,
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    shutdown: bool,
}

impl<E, C, K> DockWorker<E, C, K>
where
    E: PortEnumerator,
    C: PortConnector,
    K: DockSink,
{
    pub fn new(
        enumerator: E,
        connector: C,
        sink: K,
        config: WatchConfig,
        cmd_rx: mpsc::Receiver<WorkerCommand>,
        status_tx: watch::Sender<WorkerStatus>,
    ) -> Self {
        Self {
            enumerator,
            connector,
            sink,
            prober: HandshakeProber::with_config(config.link.clone()),
            config,
            debouncer: Debouncer::new(),
            status_tx,
            cmd_rx,
            shutdown: false,
        }
    }

    /// Run until shutdown is requested
    pub async fn run(mut self) {
        info!("Dock worker started");

        while !self.shutdown {
            if let Some(link) = self.discover().await {
                self.poll(link).await;
            }
        }

        self.set_link(LinkState::Stopped);
        info!("Dock worker stopped");
    }

    /// Repeat discovery passes until a holder binds or shutdown
    async fn discover(&mut self) -> Option<DockLink<C::Stream>> {
        self.set_link(LinkState::Searching);
        let mut passes: u64 = 0;

        while !self.shutdown {
            let pass = discover_once(&self.enumerator, &self.connector, &self.prober);
            match interruptible(&mut self.cmd_rx, pass).await {
                Some(Some(link)) => return Some(link),
                Some(None) => {}
                None => {
                    self.shutdown = true;
                    break;
                }
            }

            passes += 1;
            if passes == 1 {
                info!(
                    "No headphone holder found, retrying every {:?}",
                    self.config.discovery_backoff()
                );
            }

            let backoff = sleep(self.config.discovery_backoff());
            if interruptible(&mut self.cmd_rx, backoff).await.is_none() {
                self.shutdown = true;
            }
        }

        None
    }

    /// Poll a bound holder until the link fails or shutdown
    async fn poll(&mut self, mut link: DockLink<C::Stream>) {
        let port = link.port().to_string();
        info!("Polling headphone holder on {}", port);
        self.set_link(LinkState::Bound { port: port.clone() });

        while !self.shutdown {
            match interruptible(&mut self.cmd_rx, poll_once(&mut link)).await {
                Some(Ok(response)) => self.apply(response),
                Some(Err(e)) => {
                    warn!("Lost connection to headphone holder on {}: {}", port, e);
                    break;
                }
                None => {
                    self.shutdown = true;
                    break;
                }
            }

            let pause = sleep(self.config.poll_interval());
            if interruptible(&mut self.cmd_rx, pause).await.is_none() {
                self.shutdown = true;
            }
        }

        link.close().await;
    }

    /// Feed a poll result through the debouncer
    fn apply(&mut self, response: PollResponse) {
        let Some(docked) = response.docked() else {
            return;
        };

        if let Some(docked) = self.debouncer.observe(docked) {
            info!(
                "Headphones {}",
                if docked { "docked" } else { "undocked" }
            );
            self.sink.on_dock_change(docked);
            self.status_tx.send_modify(|status| status.docked = docked);
        }
    }

    fn set_link(&self, link: LinkState) {
        self.status_tx.send_modify(|status| status.link = link);
    }
}

/// Run a future unless a command arrives first
///
/// Returns `None` when the worker should stop.
async fn interruptible<F: Future>(
    cmd_rx: &mut mpsc::Receiver<WorkerCommand>,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        output = fut => Some(output),
        cmd = cmd_rx.recv() => {
            match cmd {
                Some(WorkerCommand::Shutdown) => info!("Shutdown requested for dock worker"),
                None => debug!("Dock worker command channel closed"),
            }
            None
        }
    }
}

/// Handle to a running worker task
pub struct WorkerHandle {
    cmd_tx: mpsc::Sender<WorkerCommand>,
    status_rx: watch::Receiver<WorkerStatus>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Latest published status
    pub fn status(&self) -> WorkerStatus {
        self.status_rx.borrow().clone()
    }

    /// Last confirmed docked state
    pub fn is_docked(&self) -> bool {
        self.status_rx.borrow().docked
    }

    /// Receiver that is notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<WorkerStatus> {
        self.status_rx.clone()
    }

    /// Stop the worker and wait for it to close its link
    pub async fn shutdown(self) {
        if self.cmd_tx.send(WorkerCommand::Shutdown).await.is_err() {
            debug!("Dock worker already stopped");
        }
        if let Err(e) = self.task.await {
            warn!("Dock worker task failed: {}", e);
        }
    }
}

/// Spawn a worker on the current tokio runtime
pub fn spawn_worker<E, C, K>(enumerator: E, connector: C, sink: K, config: WatchConfig) -> WorkerHandle
where
    E: PortEnumerator + 'static,
    C: PortConnector + 'static,
    K: DockSink,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (status_tx, status_rx) = watch::channel(WorkerStatus::default());

    let worker = DockWorker::new(enumerator, connector, sink, config, cmd_rx, status_tx);
    let task = tokio::spawn(worker.run());

    WorkerHandle {
        cmd_tx,
        status_rx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_initial_status() {
        let status = WorkerStatus::default();
        assert_eq!(status.link, LinkState::Searching);
        assert!(!status.docked);
    }

    #[tokio::test]
    async fn test_interruptible_completes() {
        let (_tx, mut rx) = mpsc::channel(1);
        assert_eq!(interruptible(&mut rx, async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interruptible_shutdown() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(WorkerCommand::Shutdown).await.unwrap();

        let result = interruptible(&mut rx, sleep(Duration::from_secs(60))).await;
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interruptible_closed_channel() {
        let (tx, mut rx) = mpsc::channel::<WorkerCommand>(1);
        drop(tx);

        let result = interruptible(&mut rx, sleep(Duration::from_secs(60))).await;
        assert!(result.is_none());
    }
}
