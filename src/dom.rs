use scraper::{ElementRef, Node};
use std::collections::{BTreeMap, BTreeSet};

/// A node of a parsed HTML fragment: either a run of text or an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    Text(String),
    Element(Element),
}

/// An HTML element with its class tokens, attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: BTreeSet::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<DocumentNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: Vec<DocumentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

impl From<Element> for DocumentNode {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Unlinks descendants through a work list; parsed pages can nest deeper
/// than the stack allows.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let DocumentNode::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

/// Converts a `scraper` subtree. Comments, doctypes and processing
/// instructions have no text to contribute and are dropped.
impl From<ElementRef<'_>> for Element {
    fn from(root: ElementRef<'_>) -> Self {
        let mut converted = None;
        let mut stack = vec![(Element::shallow(root.value()), root.children())];

        while let Some((element, children)) = stack.last_mut() {
            match children.next() {
                Some(child) => match child.value() {
                    Node::Text(text) => {
                        element.children.push(DocumentNode::Text(text.to_string()))
                    }
                    Node::Element(value) => {
                        stack.push((Element::shallow(value), child.children()))
                    }
                    _ => {}
                },
                None => {
                    if let Some((done, _)) = stack.pop() {
                        match stack.last_mut() {
                            Some((parent, _)) => parent.children.push(done.into()),
                            None => converted = Some(done),
                        }
                    }
                }
            }
        }

        converted.unwrap_or_default()
    }
}

impl Element {
    /// Tag, classes and attributes of `value`, without children.
    fn shallow(value: &scraper::node::Element) -> Self {
        Self {
            tag: value.name().to_string(),
            classes: value.classes().map(String::from).collect(),
            attributes: value
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            children: Vec::new(),
        }
    }
}
