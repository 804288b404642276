//! Serial port scanner
//!
//! This module provides serial port enumeration.

use serialport::{available_ports, SerialPortType};
use tracing::{debug, info};

use crate::error::DetectError;

/// Source of candidate port names for discovery
pub trait PortEnumerator: Send + Sync {
    /// List the port names currently present, in probe order
    fn enumerate(&self) -> Result<Vec<String>, DetectError>;
}

impl<F> PortEnumerator for F
where
    F: Fn() -> Result<Vec<String>, DetectError> + Send + Sync,
{
    fn enumerate(&self) -> Result<Vec<String>, DetectError> {
        self()
    }
}

/// Information about a serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., /dev/ttyACM0, COM3)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB product string
    pub product: Option<String>,
}

impl SerialPortInfo {
    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                product: None,
            },
        }
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Skip ports whose name contains any of these patterns
    pub skip_patterns: Vec<String>,
}

impl ScannerConfig {
    /// Patterns skipped unless the user overrides them
    pub fn default_skip_patterns() -> Vec<String> {
        vec![
            // Bluetooth ports on macOS
            "Bluetooth".to_string(),
            // Debug/logging ports
            "debug".to_string(),
        ]
    }
}

/// Serial port scanner
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig {
                skip_patterns: ScannerConfig::default_skip_patterns(),
            },
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Enumerate all available serial ports
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        debug!("Enumerating serial ports...");
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| SerialPortInfo::from_serialport(p.port_name, &p.port_type))
            .filter(|p| !self.should_skip_port(&p.port))
            .collect();

        if result.is_empty() {
            debug!("No serial ports found");
        } else {
            debug!("Found {} serial port(s)", result.len());
            for port in &result {
                let desc = port.product.as_deref().unwrap_or("Unknown");
                match (port.vid, port.pid) {
                    (Some(vid), Some(pid)) => {
                        debug!("  {} - {} ({:04X}:{:04X})", port.port, desc, vid, pid)
                    }
                    _ => debug!("  {} - {}", port.port, desc),
                }
            }
        }

        Ok(result)
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, port: &str) -> bool {
        let skip = self
            .config
            .skip_patterns
            .iter()
            .any(|pattern| port.contains(pattern.as_str()));
        if skip {
            info!("Skipping port {}", port);
        }
        skip
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PortEnumerator for PortScanner {
    fn enumerate(&self) -> Result<Vec<String>, DetectError> {
        Ok(self
            .enumerate_ports()?
            .into_iter()
            .map(|info| info.port)
            .collect())
    }
}
