use anyhow::{anyhow, Result};
use kuchiki::parse_html;
use kuchiki::traits::*;
use kuchiki::NodeRef;

/// A parsed HTML document shared with the host.
///
/// The underlying kuchiki tree is reference counted and interior mutable:
/// the host keeps its own node handles, mutates the tree, and calls
/// [`crate::EventDelegator::rescan`] afterwards.
#[derive(Clone)]
pub struct Document {
    root: NodeRef,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            root: parse_html().one(html),
        }
    }

    pub fn from_root(root: NodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// The element the ancestor walk stops at, exclusive. Everything the
    /// engine delegates for lives under `<body>`.
    pub fn boundary(&self) -> Option<NodeRef> {
        self.root
            .select_first("body")
            .ok()
            .map(|body| body.as_node().clone())
    }

    /// Whether any element in the document carries `attribute_name`.
    pub fn uses_attribute(&self, attribute_name: &str) -> bool {
        let selector = format!("[{}]", attribute_name.to_ascii_lowercase());
        match self.root.select(&selector) {
            Ok(mut matches) => matches.next().is_some(),
            Err(()) => {
                tracing::warn!(
                    target: "domwire",
                    selector = %selector,
                    "failed to compile attribute selector"
                );
                false
            }
        }
    }

    pub fn element_by_id(&self, id: &str) -> Result<NodeRef> {
        self.root
            .select_first(&format!("#{id}"))
            .map(|found| found.as_node().clone())
            .map_err(|_| anyhow!("no element with id `{id}`"))
    }
}

/// Read an attribute value. The name is lowercased first: HTML attribute
/// names are ASCII case-insensitive and the parser stores them lowercased.
pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes
        .get(name.to_ascii_lowercase().as_str())
        .map(str::to_string)
}

pub fn has_attribute(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .map(|element| {
            element
                .attributes
                .borrow()
                .contains(name.to_ascii_lowercase().as_str())
        })
        .unwrap_or(false)
}

/// Nearest ancestor that is an element node.
pub fn parent_element(node: &NodeRef) -> Option<NodeRef> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if candidate.as_element().is_some() {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_lookup_is_case_insensitive() {
        let document = Document::parse(
            r#"<html><body><button id="b" dw-preventDefault="true">x</button></body></html>"#,
        );
        let button = document.element_by_id("b").expect("button");

        assert_eq!(
            attribute(&button, "dw-preventDefault").as_deref(),
            Some("true")
        );
        assert_eq!(
            attribute(&button, "dw-preventdefault").as_deref(),
            Some("true")
        );
        assert!(has_attribute(&button, "DW-PREVENTDEFAULT"));
        assert!(attribute(&button, "dw-click").is_none());
    }

    #[test]
    fn uses_attribute_sees_live_mutations() {
        let document = Document::parse(r#"<html><body><div id="d">x</div></body></html>"#);
        assert!(!document.uses_attribute("dw-click"));

        let div = document.element_by_id("d").expect("div");
        div.as_element()
            .expect("element")
            .attributes
            .borrow_mut()
            .insert("dw-click", "mod$f()".to_string());

        assert!(document.uses_attribute("dw-click"));
    }

    #[test]
    fn parent_element_walks_to_body() {
        let document = Document::parse(
            r#"<html><body><div id="outer"><span id="inner">x</span></div></body></html>"#,
        );
        let inner = document.element_by_id("inner").expect("inner");
        let outer = parent_element(&inner).expect("outer");
        assert_eq!(attribute(&outer, "id").as_deref(), Some("outer"));

        let body = parent_element(&outer).expect("body");
        assert!(document.boundary().is_some_and(|boundary| boundary == body));
    }
}
