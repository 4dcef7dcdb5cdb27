//! Element tree addressed by page behaviors.

use pm_core::PageError;
use pm_core::PageResult;

/// ID used to address nodes in the DOM arena.
pub type NodeId = u64;

/// Single element node: tag, optional id, class set, attributes, text.
///
/// The class list keeps insertion order but behaves as a set: adding an
/// already-present token is a no-op, so repeated toggling is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    text: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    /// Adds a class token. Idempotent: present tokens are left alone.
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        self.classes.push(class.to_owned());
    }

    /// Removes a class token. Absent tokens are a no-op.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|existing| existing != class);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .attributes
            .iter_mut()
            .find(|(existing, _)| *existing == name)
        {
            entry.1 = value;
            return;
        }
        self.attributes.push((name, value));
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Flat element arena. Insertion order is document order for queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dom {
    nodes: Vec<(NodeId, Element)>,
    next_id: NodeId,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) -> NodeId {
        self.next_id = self.next_id.saturating_add(1);
        let id = self.next_id;
        self.nodes.push((id, element));
        id
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, element)| element)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes
            .iter_mut()
            .find(|(id, _)| *id == node)
            .map(|(_, element)| element)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First element matching the selector, in document order.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, element)| selector.matches(element))
            .map(|(id, _)| *id)
    }

    /// All elements matching the selector, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, element)| selector.matches(element))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Minimal selector: a bare tag name, `#id`, or `.class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Id(String),
    Class(String),
}

impl Selector {
    pub fn parse(input: &str) -> PageResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PageError::new("dom.selector_empty", "selector is empty"));
        }

        let (kind, name) = match trimmed.as_bytes()[0] {
            b'.' => ("class", &trimmed[1..]),
            b'#' => ("id", &trimmed[1..]),
            _ => ("tag", trimmed),
        };

        if name.is_empty() {
            return Err(PageError::new(
                "dom.selector_empty",
                format!("{kind} selector has no name: `{trimmed}`"),
            ));
        }

        if !name.chars().all(is_selector_name_char) {
            return Err(PageError::new(
                "dom.selector_unsupported",
                format!("unsupported selector `{trimmed}` (expected tag, #id or .class)"),
            ));
        }

        Ok(match kind {
            "class" => Self::Class(name.to_owned()),
            "id" => Self::Id(name.to_owned()),
            _ => Self::Tag(name.to_ascii_lowercase()),
        })
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Tag(tag) => element.tag().eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
        }
    }
}

fn is_selector_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')
}
