//! Headphone Holder Simulation Library
//!
//! This crate provides a simulation layer for exercising discovery and
//! polling without a physical holder. It includes:
//!
//! - **VirtualHolder**: answers the holder protocol, or plays a different
//!   device that happens to sit on a serial port
//! - **SimBus**: a set of named simulated ports that can be enumerated and
//!   opened like real serial ports
//!
//! # Example
//!
//! ```rust
//! use dock_sim::{Personality, VirtualHolder};
//!
//! let mut holder = VirtualHolder::new(Personality::Holder);
//! holder.set_docked(true);
//!
//! assert_eq!(holder.respond("Docked?").unwrap(), b"Yes!\r\n");
//! ```

pub mod bus;
pub mod holder;
pub mod holder_task;

pub use bus::SimBus;
pub use holder::{HolderHandle, Personality, VirtualHolder};
pub use holder_task::run_virtual_holder_task;
