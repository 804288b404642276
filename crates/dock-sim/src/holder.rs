//! Virtual headphone holder

use std::sync::{Arc, Mutex, MutexGuard};

use dock_protocol::{encode_reply, status_reply, DockRequest, HANDSHAKE_ACK};
use tokio::sync::watch;

/// What kind of device sits on a simulated port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Personality {
    /// Holder running the expected firmware
    Holder,
    /// Device that never writes anything
    Silent,
    /// Device that answers every line with the same text
    Impostor(String),
}

/// Device model answering one request line at a time
#[derive(Debug)]
pub struct VirtualHolder {
    personality: Personality,
    docked: bool,
    muted: bool,
    handshakes: usize,
    status_queries: usize,
}

impl VirtualHolder {
    /// Create an undocked device
    pub fn new(personality: Personality) -> Self {
        Self {
            personality,
            docked: false,
            muted: false,
            handshakes: 0,
            status_queries: 0,
        }
    }

    pub fn docked(&self) -> bool {
        self.docked
    }

    pub fn set_docked(&mut self, docked: bool) {
        self.docked = docked;
    }

    /// Stop answering while staying connected
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Handshake challenges received so far
    pub fn handshakes(&self) -> usize {
        self.handshakes
    }

    /// Status queries received so far
    pub fn status_queries(&self) -> usize {
        self.status_queries
    }

    /// Process one received line and produce the reply bytes, if any
    pub fn respond(&mut self, line: &str) -> Option<Vec<u8>> {
        let request = DockRequest::parse(line);
        match request {
            Some(DockRequest::Handshake) => self.handshakes += 1,
            Some(DockRequest::Status) => self.status_queries += 1,
            None => {}
        }

        if self.muted {
            return None;
        }

        match &self.personality {
            Personality::Silent => None,
            Personality::Impostor(text) => Some(encode_reply(text)),
            Personality::Holder => match request? {
                DockRequest::Handshake => Some(encode_reply(HANDSHAKE_ACK)),
                DockRequest::Status => Some(encode_reply(status_reply(self.docked))),
            },
        }
    }
}

/// Shared control over a simulated device
///
/// Clones refer to the same device, so a test can keep one while the bus
/// serves connections with another.
#[derive(Debug, Clone)]
pub struct HolderHandle {
    holder: Arc<Mutex<VirtualHolder>>,
    plugged: Arc<watch::Sender<bool>>,
}

impl HolderHandle {
    /// Wrap a device; it starts plugged in
    pub fn new(holder: VirtualHolder) -> Self {
        let (plugged, _) = watch::channel(true);
        Self {
            holder: Arc::new(Mutex::new(holder)),
            plugged: Arc::new(plugged),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VirtualHolder> {
        self.holder
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_docked(&self, docked: bool) {
        self.lock().set_docked(docked);
    }

    pub fn docked(&self) -> bool {
        self.lock().docked()
    }

    pub fn set_muted(&self, muted: bool) {
        self.lock().set_muted(muted);
    }

    pub fn handshakes(&self) -> usize {
        self.lock().handshakes()
    }

    pub fn status_queries(&self) -> usize {
        self.lock().status_queries()
    }

    /// Process one received line on behalf of a connection
    pub fn respond(&self, line: &str) -> Option<Vec<u8>> {
        self.lock().respond(line)
    }

    /// Pull the cable: open connections drop and the port disappears
    pub fn unplug(&self) {
        self.plugged.send_replace(false);
    }

    /// Plug the cable back in
    pub fn replug(&self) {
        self.plugged.send_replace(true);
    }

    pub fn is_plugged(&self) -> bool {
        *self.plugged.borrow()
    }

    /// Watch the plugged state
    pub fn subscribe_plugged(&self) -> watch::Receiver<bool> {
        self.plugged.subscribe()
    }
}
