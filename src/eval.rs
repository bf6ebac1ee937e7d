//! Evaluation of argument tokens into runtime values.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kuchiki::NodeRef;

use crate::event::DomEvent;
use crate::module::Callable;

/// A runtime value handed to an invoked handler.
#[derive(Clone)]
pub enum Value {
    Element(NodeRef),
    Event(Rc<DomEvent>),
    Text(String),
    Number(f64),
    Callback(Callable),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&NodeRef> {
        match self {
            Value::Element(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&Rc<DomEvent>> {
        match self {
            Value::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callable> {
        match self {
            Value::Callback(callable) => Some(callable),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Element(a), Value::Element(b)) => a == b,
            (Value::Event(a), Value::Event(b)) => Rc::ptr_eq(a, b),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Element(node) => {
                let tag = node
                    .as_element()
                    .map(|element| element.name.local.to_string())
                    .unwrap_or_else(|| "?".to_string());
                write!(f, "Element(<{tag}>)")
            }
            Value::Event(event) => write!(f, "Event({})", event.name()),
            Value::Text(text) => write!(f, "Text({text:?})"),
            Value::Number(number) => write!(f, "Number({number})"),
            Value::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Name → callable lookup for bare function-reference arguments.
///
/// Injected rather than read from ambient global state so the engine tests
/// without a real global namespace.
pub trait FunctionLookup {
    fn lookup(&self, name: &str) -> Option<Callable>;
}

/// Plain map-backed [`FunctionLookup`].
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Callable>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, function: Callable) {
        self.functions.insert(name.into(), function);
    }
}

impl FunctionLookup for FunctionRegistry {
    fn lookup(&self, name: &str) -> Option<Callable> {
        self.functions.get(name).cloned()
    }
}

/// Turn one argument token into a runtime value.
///
/// Resolution order, first match wins: the matched element, the event,
/// quoted text, a number, a registered function, the raw token.
pub fn evaluate_argument(
    token: &str,
    event: &Rc<DomEvent>,
    element: &NodeRef,
    functions: &dyn FunctionLookup,
) -> Value {
    match token {
        "this" => return Value::Element(element.clone()),
        "event" => return Value::Event(Rc::clone(event)),
        _ => {}
    }

    if let Some(inner) = quoted_inner(token) {
        return Value::Text(inner.to_string());
    }

    if let Ok(number) = token.parse::<f64>() {
        return Value::Number(number);
    }

    if let Some(callable) = functions.lookup(token) {
        return Value::Callback(callable);
    }

    Value::Text(token.to_string())
}

/// Inner text of a token wrapped in matching quote characters. Backtick
/// contents are substituted literally, never interpolated.
fn quoted_inner(token: &str) -> Option<&str> {
    for quote in ['"', '\'', '`'] {
        let Some(rest) = token.strip_prefix(quote) else {
            continue;
        };
        if let Some(inner) = rest.strip_suffix(quote) {
            return Some(inner);
        }
    }
    None
}
