//! Headphone Holder Watch Engine
//!
//! This crate keeps a connection to the headphone holder alive and turns its
//! status replies into dock/undock events.
//!
//! # Architecture
//!
//! A single background task owns everything:
//!
//! - **Discovery**: enumerate ports, probe them in order, bind to the first
//!   one that completes the handshake; back off and retry forever when none does
//! - **Polling**: query the bound holder on a fixed interval; timeouts are
//!   ignored, any other I/O failure drops the link and returns to discovery
//! - **Debouncing**: only changes of the docked state reach the [`DockSink`]
//!
//! The foreground talks to the task through a [`WorkerHandle`]: a command
//! channel for shutdown and a watch channel carrying [`WorkerStatus`].
//!
//! # Example
//!
//! ```rust,no_run
//! use dock_detect::{PortScanner, SerialConnector};
//! use dock_watch::{spawn_worker, WatchConfig};
//!
//! # async fn run() {
//! let handle = spawn_worker(
//!     PortScanner::new(),
//!     SerialConnector,
//!     |docked: bool| println!("docked: {}", docked),
//!     WatchConfig::default(),
//! );
//!
//! // ... later
//! handle.shutdown().await;
//! # }
//! ```

pub mod config;
pub mod debounce;
pub mod discovery;
pub mod poll;
pub mod sink;
pub mod worker;

pub use config::WatchConfig;
pub use debounce::Debouncer;
pub use discovery::{dedup_ports, discover_once};
pub use poll::poll_once;
pub use sink::DockSink;
pub use worker::{spawn_worker, DockWorker, LinkState, WorkerCommand, WorkerHandle, WorkerStatus};
