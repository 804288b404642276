//! Line-oriented link to a holder
//!
//! A [`DockLink`] wraps any async byte stream (a serial port in production,
//! a `tokio::io::duplex` pipe in tests) and applies the holder's read and
//! write timeouts to every exchange.

use std::fmt;
use std::io;
use std::time::Duration;

use dock_protocol::{DockRequest, LineCodec};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, trace};

use crate::error::LinkError;

/// Serial settings for talking to the holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Time allowed for one complete reply line
    pub read_timeout_ms: u64,
    /// Time allowed for writing one request
    pub write_timeout_ms: u64,
    /// Assert DTR after opening
    pub dtr: bool,
    /// Pause between opening a port and sending the challenge
    pub settle_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            read_timeout_ms: 1500,
            write_timeout_ms: 1500,
            dtr: true,
            settle_ms: 50,
        }
    }
}

impl LinkConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// An open connection to a port, bound or about to be
pub struct DockLink<S> {
    port: String,
    stream: S,
    codec: LineCodec,
    config: LinkConfig,
}

impl<S> fmt::Debug for DockLink<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockLink")
            .field("port", &self.port)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> DockLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already opened stream
    pub fn new(port: impl Into<String>, stream: S, config: LinkConfig) -> Self {
        Self {
            port: port.into(),
            stream,
            codec: LineCodec::new(),
            config,
        }
    }

    /// Name of the port this link is open on
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Write one request line within the write timeout
    pub async fn send(&mut self, request: DockRequest) -> Result<(), LinkError> {
        let data = request.encode();
        let limit = self.config.write_timeout();
        trace!("{} <- {:?}", self.port, request.text());

        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(&data).await?;
            stream.flush().await
        };

        match timeout(limit, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(io_failure(e, limit)),
            Err(_) => Err(LinkError::Timeout(limit)),
        }
    }

    /// Read one reply line within the read timeout
    ///
    /// Bytes past the returned line stay buffered for the next call.
    pub async fn read_line(&mut self) -> Result<String, LinkError> {
        let limit = self.config.read_timeout();
        let deadline = Instant::now() + limit;
        let mut buf = [0u8; 64];

        loop {
            if let Some(line) = self.codec.next_line() {
                trace!("{} -> {:?}", self.port, line);
                return Ok(line);
            }

            match timeout_at(deadline, self.stream.read(&mut buf)).await {
                Ok(Ok(0)) => return Err(LinkError::Closed),
                Ok(Ok(n)) => self.codec.push_bytes(&buf[..n]),
                Ok(Err(e)) => return Err(io_failure(e, limit)),
                Err(_) => return Err(LinkError::Timeout(limit)),
            }
        }
    }

    /// Send a request and wait for the reply line
    pub async fn exchange(&mut self, request: DockRequest) -> Result<String, LinkError> {
        self.send(request).await?;
        self.read_line().await
    }

    /// Release the port
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("Error shutting down {}: {}", self.port, e);
        }
        debug!("Closed {}", self.port);
    }
}

/// Serial drivers report their own timeouts as I/O errors
fn io_failure(e: io::Error, limit: Duration) -> LinkError {
    if e.kind() == io::ErrorKind::TimedOut {
        LinkError::Timeout(limit)
    } else {
        LinkError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LinkConfig {
        LinkConfig {
            read_timeout_ms: 100,
            write_timeout_ms: 100,
            settle_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_link_config_default() {
        let config = LinkConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_millis(1500));
        assert_eq!(config.write_timeout(), Duration::from_millis(1500));
        assert!(config.dtr);
    }

    #[test]
    fn test_link_config_partial_json() {
        let config: LinkConfig = serde_json::from_str(r#"{"baud_rate": 115200}"#).unwrap();
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.read_timeout_ms, 1500);
    }

    #[tokio::test]
    async fn test_send_writes_request_line() {
        let (mut device, host) = tokio::io::duplex(256);
        let mut link = DockLink::new("sim0", host, fast_config());

        link.send(DockRequest::Status).await.unwrap();

        let mut buf = [0u8; 16];
        let n = device.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"Docked?\n");
    }

    #[tokio::test]
    async fn test_read_line_across_chunks() {
        let (mut device, host) = tokio::io::duplex(256);
        let mut link = DockLink::new("sim0", host, fast_config());

        let writer = tokio::spawn(async move {
            device.write_all(b"Ye").await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            device.write_all(b"s!\r\nNo!\r\n").await.unwrap();
            device
        });

        assert_eq!(link.read_line().await.unwrap(), "Yes!");
        assert_eq!(link.read_line().await.unwrap(), "No!");
        let _device = writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_line_timeout() {
        let (_device, host) = tokio::io::duplex(256);
        let mut link = DockLink::new("sim0", host, fast_config());

        let err = link.read_line().await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_partial_line_times_out() {
        let (mut device, host) = tokio::io::duplex(256);
        let mut link = DockLink::new("sim0", host, fast_config());

        device.write_all(b"Yes I a").await.unwrap();
        let err = link.read_line().await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_read_line_closed() {
        let (device, host) = tokio::io::duplex(256);
        let mut link = DockLink::new("sim0", host, fast_config());
        drop(device);

        let err = link.read_line().await.unwrap_err();
        assert!(matches!(err, LinkError::Closed));
    }

    #[test]
    fn test_debug_shows_port_without_stream() {
        let (_device, host) = tokio::io::duplex(8);
        let link = DockLink::new("COM3", host, fast_config());

        let text = format!("{:?}", link);
        assert!(text.starts_with("DockLink"));
        assert!(text.contains("\"COM3\""));
        assert!(text.contains("read_timeout_ms: 100"));
    }

    #[test]
    fn test_timed_out_io_error_is_timeout() {
        let limit = Duration::from_millis(5);
        let err = io_failure(io::Error::from(io::ErrorKind::TimedOut), limit);
        assert!(err.is_timeout());

        let err = io_failure(io::Error::from(io::ErrorKind::BrokenPipe), limit);
        assert!(matches!(err, LinkError::Io(_)));
    }
}
