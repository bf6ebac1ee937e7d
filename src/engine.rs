//! Watched-type registry, document scanning, listener lifecycle, and the
//! public entry points.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::{debug, error, info};

use crate::dispatch;
use crate::dom::Document;
use crate::error::DispatchError;
use crate::eval::FunctionLookup;
use crate::event::{DispatchOutcome, DomEvent};
use crate::module::ModuleLoader;

/// Attribute namespace prefix applied to event-type names and the two
/// control attributes. Fixed for the engine's lifetime.
pub const DEFAULT_PREFIX: &str = "dw-";

/// Event types a typical page wires up at bootstrap.
pub const DEFAULT_EVENT_TYPES: [&str; 5] = ["click", "submit", "keyup", "mouseout", "mouseleave"];

/// Receives native listener install/remove notifications so the host can
/// bind or unbind its event sources.
pub trait ListenerHost {
    fn install(&self, event_type: &str);
    fn remove(&self, event_type: &str);
}

/// Host that binds nothing; for hosts that poll
/// [`EventDelegator::is_listening`] instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullListenerHost;

impl ListenerHost for NullListenerHost {
    fn install(&self, _event_type: &str) {}
    fn remove(&self, _event_type: &str) {}
}

/// The delegation engine: tracks which event types the document currently
/// references, keeps exactly one native listener per referenced type, and
/// dispatches fired events through the handler pipeline.
pub struct EventDelegator {
    document: Document,
    prefix: String,
    watched: RefCell<BTreeMap<String, bool>>,
    loader: Rc<dyn ModuleLoader>,
    functions: Rc<dyn FunctionLookup>,
    host: Rc<dyn ListenerHost>,
}

impl EventDelegator {
    pub fn new(
        document: Document,
        loader: Rc<dyn ModuleLoader>,
        functions: Rc<dyn FunctionLookup>,
        host: Rc<dyn ListenerHost>,
    ) -> Self {
        Self::with_prefix(DEFAULT_PREFIX, document, loader, functions, host)
    }

    pub fn with_prefix(
        prefix: impl Into<String>,
        document: Document,
        loader: Rc<dyn ModuleLoader>,
        functions: Rc<dyn FunctionLookup>,
        host: Rc<dyn ListenerHost>,
    ) -> Self {
        Self {
            document,
            prefix: prefix.into(),
            watched: RefCell::new(BTreeMap::new()),
            loader,
            functions,
            host,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Declare additional candidate event types, then scan immediately.
    ///
    /// Types are appended with no active listener; the set never shrinks.
    /// Re-declaring a type is a no-op, so duplicate registration cannot
    /// double-install.
    pub fn register_event_types<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut watched = self.watched.borrow_mut();
            for name in names {
                watched.entry(name.into()).or_insert(false);
            }
        }
        self.scan();
    }

    /// Re-evaluate which watched types the document references and
    /// reconcile listeners. Callers invoke this after structural DOM
    /// changes; nothing watches the tree for mutations.
    pub fn rescan(&self) {
        self.scan();
    }

    /// Whether a native listener is currently active for `event_type`.
    pub fn is_listening(&self, event_type: &str) -> bool {
        self.watched
            .borrow()
            .get(event_type)
            .copied()
            .unwrap_or(false)
    }

    pub fn active_event_types(&self) -> Vec<String> {
        self.watched
            .borrow()
            .iter()
            .filter(|(_, active)| **active)
            .map(|(event_type, _)| event_type.clone())
            .collect()
    }

    /// Hint the loader to start fetching a module reference ahead of need.
    pub fn preload(&self, reference: &str) {
        self.loader.preload(reference);
    }

    /// Entry point the host binds its active listeners to. Events whose
    /// type has no active listener are ignored.
    pub async fn handle_event(&self, event: &Rc<DomEvent>) -> DispatchOutcome {
        if !self.is_listening(event.name()) {
            return DispatchOutcome::default();
        }

        let boundary = self.document.boundary();
        dispatch::dispatch(
            &self.prefix,
            event,
            boundary.as_ref(),
            self.loader.as_ref(),
            self.functions.as_ref(),
        )
        .await
    }

    /// For every watched type, query the document for at least one element
    /// carrying the corresponding attribute, then reconcile listeners
    /// against the referenced subset.
    fn scan(&self) {
        let watched_types: Vec<String> = self.watched.borrow().keys().cloned().collect();

        let mut used = BTreeSet::new();
        for event_type in watched_types {
            let attribute = format!("{}{}", self.prefix, event_type);
            if self.document.uses_attribute(&attribute) {
                used.insert(event_type);
            }
        }

        debug!(target: "domwire", used = ?used, "document scan");
        self.reconcile(&used);
    }

    /// Compare the referenced subset against each active flag and install
    /// or remove listeners where they differ.
    fn reconcile(&self, used: &BTreeSet<String>) {
        for event_type in used {
            if !self.watched.borrow().contains_key(event_type) {
                let failure = DispatchError::InternalInvariant {
                    event_type: event_type.clone(),
                };
                error!(target: "domwire", error = %failure, "scan produced an unregistered event type");
                debug_assert!(false, "{failure}");
            }
        }

        let mut watched = self.watched.borrow_mut();
        for (event_type, active) in watched.iter_mut() {
            match (used.contains(event_type), *active) {
                (true, false) => {
                    self.host.install(event_type);
                    *active = true;
                    info!(target: "domwire", event_type = %event_type, "listener activated");
                }
                (false, true) => {
                    self.host.remove(event_type);
                    *active = false;
                    info!(target: "domwire", event_type = %event_type, "listener deactivated");
                }
                _ => {}
            }
        }
    }
}
