//! Declarative attribute-driven event delegation over an HTML document.
//!
//! Elements carry `dw-<event>` attributes whose values name a module and a
//! function call, e.g. `dw-click="app/cart$add('sku-1', 1, this, event)"`.
//! The engine watches the document for referenced event types, keeps
//! exactly one native listener per referenced type, and on a fired event
//! walks the ancestor chain to the nearest match, then parses, resolves,
//! and invokes the declared handler.

pub mod dispatch;
pub mod dom;
pub mod engine;
pub mod error;
pub mod eval;
pub mod event;
pub mod expr;
pub mod module;
pub mod notify;

pub use dispatch::{resolve_chain, DispatchStep};
pub use dom::Document;
pub use engine::{
    EventDelegator, ListenerHost, NullListenerHost, DEFAULT_EVENT_TYPES, DEFAULT_PREFIX,
};
pub use error::DispatchError;
pub use eval::{evaluate_argument, FunctionLookup, FunctionRegistry, Value};
pub use event::{DispatchOutcome, DomEvent};
pub use expr::{parse_expression, tokenize_arguments, HandlerExpression};
pub use module::{
    async_callable, callable, Callable, Module, ModuleDirectory, ModuleFactory, ModuleLoader,
};
pub use notify::{
    notification_module, parse_directives, Notification, NotificationKind, Notifier,
    SwapDirective, SwapSpec,
};
