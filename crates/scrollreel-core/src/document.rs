//! In-memory element tree with a small descendant-selector engine
//!
//! The tree stands in for the page markup: elements carry a tag, a class
//! list, optional text and a layout box in document coordinates. Queries
//! return ids in document order.

use serde::Serialize;

use crate::{Error, Result};

/// Index of an element inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub usize);

/// Vertical placement of an element, in px from the top of the document
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBox {
    pub top: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub tag: String,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub layout: LayoutBox,
}

impl Element {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only a `body` root
    pub fn new() -> Self {
        let root = Element {
            id: ElementId(0),
            tag: "body".to_string(),
            classes: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
            layout: LayoutBox::default(),
        };
        Self {
            elements: vec![root],
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    /// Append a child element; `classes` is a space-separated class list
    pub fn append(
        &mut self,
        parent: ElementId,
        tag: &str,
        classes: &str,
        text: Option<&str>,
    ) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            id,
            tag: tag.to_string(),
            classes: classes.split_whitespace().map(str::to_string).collect(),
            text: text.map(str::to_string),
            parent: Some(parent),
            children: Vec::new(),
            layout: LayoutBox::default(),
        });
        self.elements[parent.0].children.push(id);
        id
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements[id.0].text.as_deref()
    }

    pub fn set_text(&mut self, id: ElementId, text: Option<String>) {
        self.elements[id.0].text = text;
    }

    pub fn layout(&self, id: ElementId) -> LayoutBox {
        self.elements[id.0].layout
    }

    pub fn set_layout(&mut self, id: ElementId, top: f64, height: f64) {
        self.elements[id.0].layout = LayoutBox { top, height };
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.elements[id.0].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.elements[parent.0].parent;
        }
        false
    }

    /// All elements below `scope` in document (pre-)order
    fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.elements[scope.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.elements[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Every element matching `selector`, in document order
    pub fn query(&self, selector: &str) -> Result<Vec<ElementId>> {
        self.query_within(self.root(), selector)
    }

    /// Elements below `scope` matching `selector`
    ///
    /// Ancestors outside `scope` still count for the descendant chain, so
    /// `.card .char span` scoped to a card behaves like a DOM query on it.
    pub fn query_within(&self, scope: ElementId, selector: &str) -> Result<Vec<ElementId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect())
    }

    /// First element matching `selector`; a miss is an error
    pub fn query_one(&self, selector: &str) -> Result<ElementId> {
        self.query_one_within(self.root(), selector)
    }

    pub fn query_one_within(&self, scope: ElementId, selector: &str) -> Result<ElementId> {
        self.query_within(scope, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))
    }
}

/// One `tag.class.class` step of a selector
#[derive(Debug, Clone, PartialEq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(raw: &str, selector: &str) -> Result<Self> {
        let invalid = || Error::InvalidSelector(selector.to_string());
        let valid_ident = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };

        let mut pieces = raw.split('.');
        let tag = match pieces.next() {
            Some("") => None,
            Some(tag) if valid_ident(tag) => Some(tag.to_string()),
            _ => return Err(invalid()),
        };
        let classes = pieces
            .map(|c| if valid_ident(c) { Ok(c.to_string()) } else { Err(invalid()) })
            .collect::<Result<Vec<_>>>()?;

        if tag.is_none() && classes.is_empty() {
            return Err(invalid());
        }
        Ok(Self { tag, classes })
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_deref().map_or(true, |tag| element.tag == tag)
            && self.classes.iter().all(|c| element.has_class(c))
    }
}

/// Descendant chain of compounds, e.g. `.card-img img`
#[derive(Debug, Clone, PartialEq)]
struct Selector {
    parts: Vec<Compound>,
}

impl Selector {
    fn parse(selector: &str) -> Result<Self> {
        let parts = selector
            .split_whitespace()
            .map(|raw| Compound::parse(raw, selector))
            .collect::<Result<Vec<_>>>()?;
        if parts.is_empty() {
            return Err(Error::InvalidSelector(selector.to_string()));
        }
        Ok(Self { parts })
    }

    fn matches(&self, doc: &Document, id: ElementId) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(doc.element(id)) {
            return false;
        }

        // Nearest-ancestor matching is exact for descendant-only chains
        let mut current = doc.element(id).parent;
        for compound in rest.iter().rev() {
            loop {
                let Some(ancestor) = current else {
                    return false;
                };
                current = doc.element(ancestor).parent;
                if compound.matches(doc.element(ancestor)) {
                    break;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, ElementId, ElementId) {
        let mut doc = Document::new();
        let root = doc.root();
        let card_a = doc.append(root, "section", "card intro", None);
        let img_a = doc.append(card_a, "div", "card-img", None);
        doc.append(img_a, "img", "", None);
        let card_b = doc.append(root, "section", "card", None);
        let img_b = doc.append(card_b, "div", "card-img", None);
        doc.append(img_b, "img", "", None);
        (doc, card_a, card_b)
    }

    #[test]
    fn test_query_descendant_chain_in_document_order() {
        let (doc, _, _) = sample();
        let imgs = doc.query(".card-img img").unwrap();
        assert_eq!(imgs.len(), 2);
        assert!(imgs[0] < imgs[1]);
        assert_eq!(doc.query(".card").unwrap().len(), 2);
        assert_eq!(doc.query("section.card.intro").unwrap().len(), 1);
    }

    #[test]
    fn test_query_within_scope() {
        let (doc, _, card_b) = sample();
        let imgs = doc.query_within(card_b, ".card-img img").unwrap();
        assert_eq!(imgs.len(), 1);
        assert!(doc.is_ancestor(card_b, imgs[0]));
    }

    #[test]
    fn test_scoped_query_sees_outer_ancestors() {
        let (doc, card_a, _) = sample();
        let img_wrapper = doc.query_one_within(card_a, ".card-img").unwrap();
        let img = doc.query_one_within(img_wrapper, ".intro img").unwrap();
        assert!(doc.is_ancestor(card_a, img));
    }

    #[test]
    fn test_query_one_missing_is_error() {
        let (doc, _, _) = sample();
        assert!(matches!(doc.query_one(".nope"), Err(Error::ElementNotFound(_))));
    }

    #[test]
    fn test_invalid_selectors() {
        let (doc, _, _) = sample();
        assert!(matches!(doc.query(""), Err(Error::InvalidSelector(_))));
        assert!(matches!(doc.query(".a > .b"), Err(Error::InvalidSelector(_))));
        assert!(matches!(doc.query("div..x"), Err(Error::InvalidSelector(_))));
    }
}
