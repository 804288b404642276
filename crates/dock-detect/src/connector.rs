//! Opening ports with the holder's line settings

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::debug;

use crate::error::DetectError;
use crate::link::LinkConfig;

/// Opens a named port as an async byte stream
pub trait PortConnector: Send + Sync {
    /// Stream type produced for an open port
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Open the named port
    ///
    /// Called inline from the worker task. Implementations must return
    /// promptly; opening a local serial device is a single `open(2)` plus
    /// termios setup and does not wait on the remote end.
    fn open(&self, port: &str, config: &LinkConfig) -> Result<Self::Stream, DetectError>;
}

/// Connector for real serial ports via tokio-serial
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl PortConnector for SerialConnector {
    type Stream = SerialStream;

    fn open(&self, port: &str, config: &LinkConfig) -> Result<SerialStream, DetectError> {
        let open_failed = |reason: String| DetectError::OpenFailed {
            port: port.to_string(),
            reason,
        };

        let mut stream = tokio_serial::new(port, config.baud_rate)
            .timeout(config.read_timeout())
            .open_native_async()
            .map_err(|e| open_failed(e.to_string()))?;

        if config.dtr {
            stream
                .write_data_terminal_ready(true)
                .map_err(|e| open_failed(format!("failed to assert DTR: {}", e)))?;
        }

        debug!("Opened {} at {} baud", port, config.baud_rate);
        Ok(stream)
    }
}
