use std::cell::RefCell;
use std::rc::Rc;

use domwire::{
    callable, Document, EventDelegator, FunctionRegistry, ListenerHost, Module, ModuleDirectory,
    DEFAULT_EVENT_TYPES,
};

/// Records every install/remove notification in order.
#[derive(Default)]
struct RecordingHost {
    log: RefCell<Vec<String>>,
}

impl RecordingHost {
    fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl ListenerHost for RecordingHost {
    fn install(&self, event_type: &str) {
        self.log.borrow_mut().push(format!("install:{event_type}"));
    }

    fn remove(&self, event_type: &str) {
        self.log.borrow_mut().push(format!("remove:{event_type}"));
    }
}

fn delegator_over(html: &str) -> (EventDelegator, Rc<RecordingHost>, ModuleDirectory) {
    let host = Rc::new(RecordingHost::default());
    let directory = ModuleDirectory::new();
    let delegator = EventDelegator::new(
        Document::parse(html),
        Rc::new(directory.clone()),
        Rc::new(FunctionRegistry::new()),
        host.clone(),
    );
    (delegator, host, directory)
}

#[test]
fn only_referenced_types_get_listeners() {
    let (delegator, host, _) = delegator_over(
        r#"<html><body>
            <button dw-click="app$save()">save</button>
            <form dw-submit="app$send()"><input></form>
        </body></html>"#,
    );

    delegator.register_event_types(DEFAULT_EVENT_TYPES);

    assert_eq!(
        host.entries(),
        vec!["install:click".to_string(), "install:submit".to_string()]
    );
    assert!(delegator.is_listening("click"));
    assert!(delegator.is_listening("submit"));
    assert!(!delegator.is_listening("keyup"));
    assert_eq!(delegator.active_event_types(), vec!["click", "submit"]);
}

#[test]
fn rescanning_without_changes_is_a_no_op() {
    let (delegator, host, _) = delegator_over(
        r#"<html><body><button dw-click="app$save()">save</button></body></html>"#,
    );

    delegator.register_event_types(["click", "keyup"]);
    let after_registration = host.entries();

    delegator.rescan();
    delegator.rescan();

    assert_eq!(host.entries(), after_registration);
}

#[test]
fn removing_and_restoring_attributes_toggles_the_listener() {
    let (delegator, host, _) = delegator_over(
        r#"<html><body><button id="b" dw-click="app$save()">save</button></body></html>"#,
    );
    delegator.register_event_types(["click"]);
    assert!(delegator.is_listening("click"));

    let button = delegator.document().element_by_id("b").expect("button");
    button
        .as_element()
        .expect("element")
        .attributes
        .borrow_mut()
        .remove("dw-click");
    delegator.rescan();
    assert!(!delegator.is_listening("click"));

    button
        .as_element()
        .expect("element")
        .attributes
        .borrow_mut()
        .insert("dw-click", "app$save()".to_string());
    delegator.rescan();
    assert!(delegator.is_listening("click"));

    assert_eq!(
        host.entries(),
        vec![
            "install:click".to_string(),
            "remove:click".to_string(),
            "install:click".to_string(),
        ]
    );
}

#[test]
fn duplicate_registration_does_not_double_install() {
    let (delegator, host, _) = delegator_over(
        r#"<html><body><button dw-click="app$save()">save</button></body></html>"#,
    );

    delegator.register_event_types(["click", "click"]);
    delegator.register_event_types(["click"]);

    assert_eq!(host.entries(), vec!["install:click".to_string()]);
}

#[test]
fn registration_before_any_usage_installs_nothing() {
    let (delegator, host, _) =
        delegator_over(r#"<html><body><p>static page</p></body></html>"#);

    delegator.register_event_types(DEFAULT_EVENT_TYPES);

    assert!(host.entries().is_empty());
    assert!(delegator.active_event_types().is_empty());
}

#[test]
fn preload_warms_the_module_directory() {
    let (delegator, _, directory) = delegator_over(
        r#"<html><body><button dw-click="app$save()">save</button></body></html>"#,
    );
    directory.register("app", || {
        Ok(Module::new().export("save", callable(|_| Ok(()))))
    });

    assert!(!directory.is_loaded("app"));
    delegator.preload("app");
    assert!(directory.is_loaded("app"));

    // Unknown references are a hint with nothing to do, never a failure.
    delegator.preload("not/registered");
}
