//! Headphone Holder Detection Library
//!
//! This crate finds the serial port the headphone holder is attached to:
//!
//! - [`PortScanner`] enumerates serial ports on the host
//! - [`SerialConnector`] opens one with the holder's line settings
//! - [`HandshakeProber`] sends the identification challenge and returns a
//!   bound [`DockLink`] only when the firmware answers correctly
//!
//! Enumeration and opening sit behind the [`PortEnumerator`] and
//! [`PortConnector`] traits so the probing logic can run against simulated
//! ports.
//!
//! # Example
//!
//! ```rust,no_run
//! use dock_detect::{HandshakeProber, PortEnumerator, PortScanner, SerialConnector};
//!
//! # async fn run() {
//! let scanner = PortScanner::new();
//! let prober = HandshakeProber::new();
//!
//! for port in scanner.enumerate().unwrap() {
//!     if let Ok(link) = prober.probe_port(&SerialConnector, &port).await {
//!         println!("Holder found on {}", link.port());
//!         break;
//!     }
//! }
//! # }
//! ```

pub mod connector;
pub mod error;
pub mod link;
pub mod probe;
pub mod scanner;

pub use connector::{PortConnector, SerialConnector};
pub use error::{DetectError, LinkError};
pub use link::{DockLink, LinkConfig};
pub use probe::HandshakeProber;
pub use scanner::{PortEnumerator, PortScanner, ScannerConfig, SerialPortInfo};
