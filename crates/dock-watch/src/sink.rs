//! Receiver of dock state changes

/// Called with the new docked state on every confirmed transition
pub trait DockSink: Send + 'static {
    fn on_dock_change(&mut self, docked: bool);
}

impl<F> DockSink for F
where
    F: FnMut(bool) + Send + 'static,
{
    fn on_dock_change(&mut self, docked: bool) {
        self(docked)
    }
}
