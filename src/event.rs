use std::cell::Cell;
use std::fmt;

use kuchiki::NodeRef;

/// A fired native event, as fed to the engine by the host.
///
/// The engine flips the two flags synchronously while resolving the
/// ancestor chain, before the handler pipeline first suspends; hosts read
/// them after [`crate::EventDelegator::handle_event`] returns or from
/// handler code holding the shared event.
pub struct DomEvent {
    name: String,
    target: NodeRef,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    pub fn new(name: impl Into<String>, target: NodeRef) -> Self {
        Self {
            name: name.into(),
            target,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &NodeRef {
        &self.target
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl fmt::Debug for DomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomEvent")
            .field("name", &self.name)
            .field("default_prevented", &self.default_prevented.get())
            .field("propagation_stopped", &self.propagation_stopped.get())
            .finish_non_exhaustive()
    }
}

/// What one dispatch did, reported back to the host listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub handlers_invoked: usize,
}
