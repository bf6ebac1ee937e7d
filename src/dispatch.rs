//! Ancestor-walk dispatch: from a fired event to the handler pipeline.

use std::rc::Rc;

use kuchiki::NodeRef;
use tracing::error;

use crate::dom;
use crate::error::DispatchError;
use crate::eval::{evaluate_argument, FunctionLookup};
use crate::event::{DispatchOutcome, DomEvent};
use crate::expr::parse_expression;
use crate::module::{execute, ModuleLoader};

/// Suffixes of the two control attributes, appended to the namespace prefix.
pub const PREVENT_DEFAULT_SUFFIX: &str = "preventDefault";
pub const STOP_PROPAGATION_SUFFIX: &str = "stopPropagation";

/// One matched ancestor, with both policy decisions snapshotted at walk
/// time.
#[derive(Clone)]
pub struct DispatchStep {
    pub element: NodeRef,
    pub expression: String,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

/// Walk from the event origin up to (excluding) `boundary`, collecting each
/// matched ancestor until one stops propagation.
///
/// Pure over the current tree: no suspension, no engine state. The policy
/// truth tables are deliberate and asymmetric:
/// - the default action is suppressed when the control attribute is absent
///   or its value is exactly `"false"`; any other value leaves it intact;
/// - propagation stops when the control attribute is absent or its value is
///   exactly `"true"`; any other value continues the walk.
pub fn resolve_chain(
    prefix: &str,
    event: &DomEvent,
    boundary: Option<&NodeRef>,
) -> Vec<DispatchStep> {
    let handler_attribute = format!("{prefix}{}", event.name());
    let prevent_attribute = format!("{prefix}{PREVENT_DEFAULT_SUFFIX}");
    let stop_attribute = format!("{prefix}{STOP_PROPAGATION_SUFFIX}");

    let mut steps = Vec::new();
    let mut node = Some(event.target().clone());

    while let Some(current) = node {
        if Some(&current) == boundary {
            break;
        }

        if let Some(expression) = dom::attribute(&current, &handler_attribute) {
            let prevent_default = match dom::attribute(&current, &prevent_attribute) {
                None => true,
                Some(value) => value == "false",
            };
            let stop_propagation = match dom::attribute(&current, &stop_attribute) {
                None => true,
                Some(value) => value == "true",
            };

            steps.push(DispatchStep {
                element: current.clone(),
                expression,
                prevent_default,
                stop_propagation,
            });

            if stop_propagation {
                break;
            }
        }

        node = dom::parent_element(&current);
    }

    steps
}

/// Run the handler pipeline for one matched step: parse the expression,
/// evaluate its arguments, load the module, invoke the export.
async fn run_step(
    step: &DispatchStep,
    event: &Rc<DomEvent>,
    loader: &dyn ModuleLoader,
    functions: &dyn FunctionLookup,
) -> Result<(), DispatchError> {
    let parsed = parse_expression(&step.expression)?;

    let args = parsed
        .arguments
        .iter()
        .map(|token| evaluate_argument(token, event, &step.element, functions))
        .collect();

    execute(loader, &parsed.module, &parsed.function, args).await
}

/// Dispatch one fired event: resolve the chain, apply the policy flags, and
/// run each matched handler in origin-to-root order.
///
/// The chain and both policy flags are settled before the first suspension
/// point; overlapping dispatches never observe half-decided flags. Pipeline
/// failures are logged and swallowed — they neither unwind the walk that
/// already completed nor skip the remaining steps.
pub(crate) async fn dispatch(
    prefix: &str,
    event: &Rc<DomEvent>,
    boundary: Option<&NodeRef>,
    loader: &dyn ModuleLoader,
    functions: &dyn FunctionLookup,
) -> DispatchOutcome {
    let steps = resolve_chain(prefix, event, boundary);

    let default_prevented = steps.iter().any(|step| step.prevent_default);
    let propagation_stopped = steps
        .last()
        .map(|step| step.stop_propagation)
        .unwrap_or(false);
    if default_prevented {
        event.prevent_default();
    }
    if propagation_stopped {
        event.stop_propagation();
    }

    let mut handlers_invoked = 0;
    for step in &steps {
        match run_step(step, event, loader, functions).await {
            Ok(()) => handlers_invoked += 1,
            Err(failure) => {
                error!(
                    target: "domwire",
                    expression = %step.expression,
                    error = %failure,
                    "handler pipeline failed"
                );
            }
        }
    }

    DispatchOutcome {
        default_prevented,
        propagation_stopped,
        handlers_invoked,
    }
}
