//! Simulated serial bus
//!
//! A [`SimBus`] is a list of named ports, each with a simulated device
//! behind it. It implements both [`PortEnumerator`] and [`PortConnector`],
//! so discovery code runs against it unchanged. Opening a port creates a
//! `tokio::io::duplex` pipe and spawns a [`run_virtual_holder_task`] for
//! the device end.

use std::sync::{Arc, Mutex, MutexGuard};

use dock_detect::{DetectError, LinkConfig, PortConnector, PortEnumerator};
use tokio::io::DuplexStream;
use tracing::{debug, warn};

use crate::holder::{HolderHandle, Personality, VirtualHolder};
use crate::holder_task::run_virtual_holder_task;

/// Pipe capacity for simulated connections
const PIPE_CAPACITY: usize = 1024;

struct SimPort {
    name: String,
    holder: HolderHandle,
    busy: bool,
    opens: usize,
}

/// Ordered set of simulated ports
#[derive(Clone, Default)]
pub struct SimBus {
    ports: Arc<Mutex<Vec<SimPort>>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SimPort>> {
        self.ports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Attach a device on a new port; ports enumerate in insertion order
    pub fn add_port(&self, name: &str, personality: Personality) -> HolderHandle {
        let holder = HolderHandle::new(VirtualHolder::new(personality));
        self.lock().push(SimPort {
            name: name.to_string(),
            holder: holder.clone(),
            busy: false,
            opens: 0,
        });
        holder
    }

    /// Make opens of a port fail as if another program held it
    pub fn set_busy(&self, name: &str, busy: bool) {
        if let Some(port) = self.lock().iter_mut().find(|p| p.name == name) {
            port.busy = busy;
        }
    }

    /// Number of successful opens of a port
    pub fn open_count(&self, name: &str) -> usize {
        self.lock()
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.opens)
            .unwrap_or(0)
    }
}

impl PortEnumerator for SimBus {
    fn enumerate(&self) -> Result<Vec<String>, DetectError> {
        Ok(self
            .lock()
            .iter()
            .filter(|p| p.holder.is_plugged())
            .map(|p| p.name.clone())
            .collect())
    }
}

impl PortConnector for SimBus {
    type Stream = DuplexStream;

    fn open(&self, port: &str, _config: &LinkConfig) -> Result<DuplexStream, DetectError> {
        let open_failed = |reason: &str| DetectError::OpenFailed {
            port: port.to_string(),
            reason: reason.to_string(),
        };

        let mut ports = self.lock();
        let sim = ports
            .iter_mut()
            .find(|p| p.name == port && p.holder.is_plugged())
            .ok_or_else(|| open_failed("no such device"))?;

        if sim.busy {
            return Err(open_failed("port busy"));
        }
        sim.opens += 1;

        let (host, device) = tokio::io::duplex(PIPE_CAPACITY);
        let holder = sim.holder.clone();
        let name = sim.name.clone();
        tokio::spawn(async move {
            if let Err(e) = run_virtual_holder_task(device, holder).await {
                warn!("Simulated port {} failed: {}", name, e);
            }
        });

        debug!("Opened simulated port {}", port);
        Ok(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_detect::HandshakeProber;

    fn fast_config() -> LinkConfig {
        LinkConfig {
            settle_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_enumerate_in_insertion_order() {
        let bus = SimBus::new();
        bus.add_port("COM5", Personality::Silent);
        bus.add_port("COM3", Personality::Holder);

        assert_eq!(bus.enumerate().unwrap(), vec!["COM5", "COM3"]);
    }

    #[test]
    fn test_unplugged_port_disappears() {
        let bus = SimBus::new();
        let holder = bus.add_port("COM3", Personality::Holder);
        holder.unplug();

        assert!(bus.enumerate().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_and_busy_ports() {
        let bus = SimBus::new();
        bus.add_port("COM3", Personality::Holder);
        bus.set_busy("COM3", true);

        assert!(matches!(
            bus.open("COM3", &fast_config()),
            Err(DetectError::OpenFailed { .. })
        ));
        assert!(matches!(
            bus.open("COM9", &fast_config()),
            Err(DetectError::OpenFailed { .. })
        ));
        assert_eq!(bus.open_count("COM3"), 0);
    }

    #[tokio::test]
    async fn test_probe_simulated_holder() {
        let bus = SimBus::new();
        let holder = bus.add_port("COM3", Personality::Holder);

        let prober = HandshakeProber::with_config(fast_config());
        let link = prober.probe_port(&bus, "COM3").await.unwrap();

        assert_eq!(link.port(), "COM3");
        assert_eq!(holder.handshakes(), 1);
        assert_eq!(bus.open_count("COM3"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_simulated_impostor() {
        let bus = SimBus::new();
        bus.add_port("COM1", Personality::Impostor("OK".to_string()));

        let prober = HandshakeProber::with_config(fast_config());
        let err = prober.probe_port(&bus, "COM1").await.unwrap_err();
        assert!(matches!(err, DetectError::HandshakeMismatch { .. }));
    }
}
