//! Boundary types for the notification component and the response-header
//! swap integration.
//!
//! Rendering and content swapping live in the host; this module defines
//! the payload shapes, the [`Notifier`] seam, and a ready-made module so
//! handler expressions can raise notifications.

use std::rc::Rc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::eval::Value;
use crate::module::{callable, Module};

pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Danger,
    Dark,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Danger => "danger",
            NotificationKind::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Display duration in milliseconds.
    #[serde(default = "default_duration")]
    pub duration: u64,
}

fn default_duration() -> u64 {
    DEFAULT_NOTIFICATION_DURATION_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapSpec {
    pub target: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

/// One directive from the swapping library's response header: show a
/// notification or swap document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SwapDirective {
    Alert(Notification),
    Swap(SwapSpec),
}

/// Parse the JSON payload the swapping library delivers in its response
/// header.
pub fn parse_directives(header: &str) -> Result<Vec<SwapDirective>, serde_json::Error> {
    serde_json::from_str(header)
}

/// Renders notifications. Implemented by the host UI component.
pub trait Notifier {
    fn show(&self, notification: &Notification);
}

/// A module exporting one notification raiser per kind, callable from
/// handler expressions as `<ref>$info('Title', 'Message', 2500)`. The
/// duration argument is optional.
pub fn notification_module(notifier: Rc<dyn Notifier>) -> Module {
    let mut module = Module::new();

    for kind in [
        NotificationKind::Info,
        NotificationKind::Success,
        NotificationKind::Warning,
        NotificationKind::Danger,
        NotificationKind::Dark,
    ] {
        let notifier = Rc::clone(&notifier);
        module = module.export(
            kind.as_str(),
            callable(move |args| {
                let notification = notification_from_args(kind, &args)?;
                notifier.show(&notification);
                Ok(())
            }),
        );
    }

    module
}

fn notification_from_args(kind: NotificationKind, args: &[Value]) -> Result<Notification> {
    let title = text_argument(args.first(), "title")?;
    let message = text_argument(args.get(1), "message")?;

    let duration = match args.get(2) {
        None => DEFAULT_NOTIFICATION_DURATION_MS,
        Some(Value::Number(number)) if *number >= 0.0 => *number as u64,
        Some(other) => bail!("duration must be a non-negative number, got {other:?}"),
    };

    Ok(Notification {
        kind,
        title,
        message,
        duration,
    })
}

fn text_argument(value: Option<&Value>, name: &str) -> Result<String> {
    match value {
        Some(Value::Text(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => bail!("{name} must be text, got {other:?}"),
        None => bail!("missing {name} argument"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct RecordingNotifier {
        shown: RefCell<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, notification: &Notification) {
            self.shown.borrow_mut().push(notification.clone());
        }
    }

    #[test]
    fn parses_the_header_payload_shapes() {
        let header = r##"[
            {"type": "alert", "data": {"type": "success", "title": "Saved", "message": "All good"}},
            {"type": "swap", "data": {"target": "#cart", "content": "<p>3 items</p>", "spec": "innerHTML"}}
        ]"##;

        let directives = parse_directives(header).expect("directives");
        assert_eq!(directives.len(), 2);

        match &directives[0] {
            SwapDirective::Alert(notification) => {
                assert_eq!(notification.kind, NotificationKind::Success);
                assert_eq!(notification.title, "Saved");
                assert_eq!(notification.duration, DEFAULT_NOTIFICATION_DURATION_MS);
            }
            other => panic!("expected alert, got {other:?}"),
        }

        match &directives[1] {
            SwapDirective::Swap(swap) => {
                assert_eq!(swap.target, "#cart");
                assert_eq!(swap.spec.as_deref(), Some("innerHTML"));
                assert!(swap.option.is_none());
            }
            other => panic!("expected swap, got {other:?}"),
        }
    }

    #[test]
    fn directives_round_trip_through_json() {
        let directives = vec![
            SwapDirective::Alert(Notification {
                kind: NotificationKind::Danger,
                title: "Failed".to_string(),
                message: "Try again".to_string(),
                duration: 2500,
            }),
            SwapDirective::Swap(SwapSpec {
                target: "#status".to_string(),
                content: "done".to_string(),
                spec: None,
                option: None,
            }),
        ];

        let encoded = serde_json::to_string(&directives).expect("encode");
        let decoded = parse_directives(&encoded).expect("decode");
        assert_eq!(decoded, directives);
    }

    #[tokio::test]
    async fn notification_module_forwards_to_the_notifier() {
        let notifier = Rc::new(RecordingNotifier::default());
        let module = notification_module(notifier.clone());

        let warning = module.get("warning").expect("warning export").clone();
        warning(vec![
            Value::Text("Low stock".to_string()),
            Value::Text("Only 2 left".to_string()),
            Value::Number(1500.0),
        ])
        .await
        .expect("invoke");

        let shown = notifier.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].kind, NotificationKind::Warning);
        assert_eq!(shown[0].title, "Low stock");
        assert_eq!(shown[0].message, "Only 2 left");
        assert_eq!(shown[0].duration, 1500);
    }

    #[tokio::test]
    async fn missing_arguments_fail_the_invocation() {
        let notifier = Rc::new(RecordingNotifier::default());
        let module = notification_module(notifier.clone());

        let info = module.get("info").expect("info export").clone();
        let result = info(vec![Value::Text("Title only".to_string())]).await;

        assert!(result.is_err());
        assert!(notifier.shown.borrow().is_empty());
    }
}
