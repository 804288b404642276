//! One discovery pass over the candidate ports
//!
//! The retry policy lives in the worker; this module only knows how to walk
//! the current port list once and stop at the first holder that answers.

use std::collections::HashSet;

use dock_detect::{DockLink, HandshakeProber, PortConnector, PortEnumerator};
use tracing::{debug, warn};

/// Drop repeated port names, keeping the first occurrence
pub fn dedup_ports(ports: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ports
        .into_iter()
        .filter(|port| seen.insert(port.clone()))
        .collect()
}

/// Enumerate ports and probe them in order until one binds
///
/// Failures on individual ports are logged and skipped. Returns `None` when
/// nothing answered the handshake, including when enumeration itself failed.
pub async fn discover_once<E, C>(
    enumerator: &E,
    connector: &C,
    prober: &HandshakeProber,
) -> Option<DockLink<C::Stream>>
where
    E: PortEnumerator + ?Sized,
    C: PortConnector,
{
    let ports = match enumerator.enumerate() {
        Ok(ports) => dedup_ports(ports),
        Err(e) => {
            warn!("Port enumeration failed: {}", e);
            return None;
        }
    };

    for port in &ports {
        debug!("Scanning port: {}", port);
        match prober.probe_port(connector, port).await {
            Ok(link) => return Some(link),
            Err(e) => debug!("Skipping {}: {}", port, e),
        }
    }

    debug!("No headphone holder among {} port(s)", ports.len());
    None
}
