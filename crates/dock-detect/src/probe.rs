//! Handshake probing for holder detection
//!
//! Other serial devices are usually plugged in next to the holder, so a port
//! is only accepted when it answers the identification challenge with the
//! exact acknowledgement. A passthrough or a chatty device must not bind.

use dock_protocol::{is_handshake_ack, DockRequest};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::connector::PortConnector;
use crate::error::{DetectError, LinkError};
use crate::link::{DockLink, LinkConfig};

/// Holder handshake prober
pub struct HandshakeProber {
    config: LinkConfig,
}

impl HandshakeProber {
    /// Create a new prober with default configuration
    pub fn new() -> Self {
        Self {
            config: LinkConfig::default(),
        }
    }

    /// Create a prober with custom configuration
    pub fn with_config(config: LinkConfig) -> Self {
        Self { config }
    }

    /// Open a port and run the handshake on it
    ///
    /// Open failures are returned as [`DetectError::OpenFailed`]. Every other
    /// failure closes the port before returning.
    pub async fn probe_port<C>(
        &self,
        connector: &C,
        port: &str,
    ) -> Result<DockLink<C::Stream>, DetectError>
    where
        C: PortConnector,
    {
        let stream = connector.open(port, &self.config)?;

        // Give the port a moment to settle
        if !self.config.settle_delay().is_zero() {
            tokio::time::sleep(self.config.settle_delay()).await;
        }

        self.handshake(port, stream).await
    }

    /// Run the handshake on an already opened stream
    ///
    /// On success the returned link owns the stream.
    pub async fn handshake<S>(&self, port: &str, stream: S) -> Result<DockLink<S>, DetectError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut link = DockLink::new(port, stream, self.config.clone());
        debug!("Sending handshake challenge on {}", port);

        match link.exchange(DockRequest::Handshake).await {
            Ok(response) if is_handshake_ack(&response) => {
                info!("Handshake established on {}", port);
                Ok(link)
            }
            Ok(response) => {
                link.close().await;
                Err(DetectError::HandshakeMismatch {
                    port: port.to_string(),
                    response,
                })
            }
            Err(LinkError::Timeout(_)) => {
                link.close().await;
                Err(DetectError::HandshakeTimeout {
                    port: port.to_string(),
                })
            }
            Err(source) => {
                link.close().await;
                Err(DetectError::Link {
                    port: port.to_string(),
                    source,
                })
            }
        }
    }
}

impl Default for HandshakeProber {
    fn default() -> Self {
        Self::new()
    }
}
