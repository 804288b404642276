//! Docked state debouncing
//!
//! The holder is polled several times a second but downstream only cares
//! about changes. The debouncer keeps the last confirmed state and reports a
//! value only when a poll contradicts it.

/// Stable docked state
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    docked: bool,
}

impl Debouncer {
    /// Start undocked
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stable state
    pub fn docked(&self) -> bool {
        self.docked
    }

    /// Feed one confirmed poll result
    ///
    /// Returns the new state on a transition and `None` otherwise.
    pub fn observe(&mut self, docked: bool) -> Option<bool> {
        if self.docked == docked {
            return None;
        }
        self.docked = docked;
        Some(docked)
    }
}
