//! In-process document model the widgets render into.
//!
//! A `Document` is a cheap handle over shared state: an element tree keyed by
//! id, head stylesheets, click listeners and the current location. Widgets get
//! a handle injected and register their listeners explicitly so the owner can
//! tear them down.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type ListenerId = u64;

type ClickHandler = Arc<dyn Fn(&Document, &ClickEvent) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    pub classes: BTreeSet<String>,
    pub parent: Option<String>,
    pub hidden: bool,
    pub inner_html: String,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    pub marker: Option<String>,
    pub css: String,
}

impl StyleSheet {
    pub fn tagged(marker: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            marker: Some(marker.into()),
            css: css.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    /// Id of the element that was clicked. Clicks on bare page areas use an id
    /// that is not registered in the document.
    pub target: String,
}

#[derive(Default)]
struct DocumentInner {
    elements: Vec<Element>,
    styles: Vec<StyleSheet>,
    listeners: Vec<(ListenerId, ClickHandler)>,
    next_listener: ListenerId,
    next_element: u64,
    location: Option<String>,
}

impl DocumentInner {
    fn find(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Walks parent links from `id`. A parent chain can be at most as long as
    /// the element list; anything longer is a cycle and never reaches `ancestor`.
    fn is_descendant(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.elements.len() {
            let Some(cur) = current else {
                return false;
            };
            if cur == ancestor {
                return true;
            }
            current = self.find(cur).and_then(|e| e.parent.as_deref());
        }
        false
    }
}

#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<Mutex<DocumentInner>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Document")
            .field("elements", &inner.elements.len())
            .field("styles", &inner.styles.len())
            .field("listeners", &inner.listeners.len())
            .field("location", &inner.location)
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `{prefix}-{n}` with `n` unique within this document.
    pub fn next_id(&self, prefix: &str) -> String {
        let mut inner = self.lock();
        inner.next_element += 1;
        format!("{}-{}", prefix, inner.next_element)
    }

    /// Appends an element, replacing any existing element with the same id.
    pub fn append_element(&self, element: Element) {
        let mut inner = self.lock();
        inner.elements.retain(|e| e.id != element.id);
        inner.elements.push(element);
    }

    /// Removes an element and everything nested under it.
    pub fn remove_element(&self, id: &str) -> bool {
        let mut inner = self.lock();
        if inner.find(id).is_none() {
            return false;
        }
        let doomed: BTreeSet<String> = inner
            .elements
            .iter()
            .filter(|e| inner.is_descendant(id, &e.id))
            .map(|e| e.id.clone())
            .collect();
        inner.elements.retain(|e| !doomed.contains(&e.id));
        true
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.lock().find(id).cloned()
    }

    /// First element carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Option<Element> {
        self.lock()
            .elements
            .iter()
            .find(|e| e.has_class(class))
            .cloned()
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<Element> {
        self.lock()
            .elements
            .iter()
            .filter(|e| e.has_class(class))
            .cloned()
            .collect()
    }

    /// True when `target` is `ancestor` itself or nested anywhere under it.
    pub fn contains(&self, ancestor: &str, target: &str) -> bool {
        let inner = self.lock();
        inner.find(ancestor).is_some() && inner.is_descendant(ancestor, target)
    }

    /// Flips `class` on the element. Returns the new state, or `None` when the
    /// element does not exist.
    pub fn toggle_class(&self, id: &str, class: &str) -> Option<bool> {
        let mut inner = self.lock();
        let element = inner.find_mut(id)?;
        if element.classes.remove(class) {
            Some(false)
        } else {
            element.classes.insert(class.to_string());
            Some(true)
        }
    }

    pub fn remove_class(&self, id: &str, class: &str) -> bool {
        self.lock()
            .find_mut(id)
            .map(|e| e.classes.remove(class))
            .unwrap_or(false)
    }

    pub fn set_hidden(&self, id: &str, hidden: bool) -> bool {
        match self.lock().find_mut(id) {
            Some(element) => {
                element.hidden = hidden;
                true
            }
            None => false,
        }
    }

    pub fn add_stylesheet(&self, style: StyleSheet) {
        self.lock().styles.push(style);
    }

    pub fn has_stylesheet(&self, marker: &str) -> bool {
        self.lock()
            .styles
            .iter()
            .any(|s| s.marker.as_deref() == Some(marker))
    }

    pub fn stylesheets(&self) -> Vec<StyleSheet> {
        self.lock().styles.clone()
    }

    pub fn add_click_listener<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&Document, &ClickEvent) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.next_listener += 1;
        let id = inner.next_listener;
        inner.listeners.push((id, Arc::new(handler)));
        id
    }

    pub fn remove_click_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Dispatches a click to every listener registered at the time of the
    /// click. Handlers run without the document lock held.
    pub fn click(&self, target: impl Into<String>) {
        let event = ClickEvent {
            target: target.into(),
        };
        let handlers: Vec<ClickHandler> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(self, &event);
        }
    }

    pub fn navigate(&self, route: impl Into<String>) {
        self.lock().location = Some(route.into());
    }

    pub fn location(&self) -> Option<String> {
        self.lock().location.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn nested_document() -> Document {
        let doc = Document::new();
        doc.append_element(Element::new("root").with_class("box"));
        doc.append_element(Element::new("child").with_parent("root"));
        doc.append_element(Element::new("grandchild").with_parent("child"));
        doc.append_element(Element::new("sibling").with_class("box"));
        doc
    }

    #[test]
    fn test_contains_walks_parents() {
        let doc = nested_document();
        assert!(doc.contains("root", "root"));
        assert!(doc.contains("root", "grandchild"));
        assert!(!doc.contains("root", "sibling"));
        assert!(!doc.contains("root", "unknown"));
        assert!(!doc.contains("missing", "missing"));
    }

    #[test]
    fn test_remove_element_drops_descendants() {
        let doc = nested_document();
        assert!(doc.remove_element("root"));
        assert!(doc.element("child").is_none());
        assert!(doc.element("grandchild").is_none());
        assert!(doc.element("sibling").is_some());
        assert!(!doc.remove_element("root"));
    }

    #[test]
    fn test_query_class_returns_first_in_order() {
        let doc = nested_document();
        assert_eq!(doc.query_class("box").map(|e| e.id), Some("root".to_string()));
        assert_eq!(doc.elements_with_class("box").len(), 2);
    }

    #[test]
    fn test_toggle_class() {
        let doc = nested_document();
        assert_eq!(doc.toggle_class("child", "active"), Some(true));
        assert_eq!(doc.toggle_class("child", "active"), Some(false));
        assert_eq!(doc.toggle_class("nope", "active"), None);
    }

    #[test]
    fn test_listener_can_remove_itself() {
        let doc = Document::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let id = Arc::new(std::sync::OnceLock::new());

        let counter = Arc::clone(&calls);
        let slot = Arc::clone(&id);
        let listener = doc.add_click_listener(move |doc, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = slot.get() {
                doc.remove_click_listener(*id);
            }
        });
        id.set(listener).unwrap();

        doc.click("anywhere");
        doc.click("anywhere");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_parent_cycles_terminate() {
        let doc = nested_document();
        doc.append_element(Element::new("loop").with_parent("loop"));
        doc.append_element(Element::new("a").with_parent("b"));
        doc.append_element(Element::new("b").with_parent("a"));

        assert!(doc.contains("loop", "loop"));
        assert!(!doc.contains("root", "loop"));
        assert!(!doc.contains("root", "a"));
        assert!(doc.contains("b", "a"));

        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        doc.add_click_listener(move |doc, event| {
            if !doc.contains("root", &event.target) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        doc.click("loop");
        doc.click("a");
        assert_eq!(clicks.load(Ordering::SeqCst), 2);

        assert!(doc.remove_element("a"));
        assert!(doc.element("b").is_none());
        assert!(doc.element("root").is_some());
    }

    #[test]
    fn test_next_id_is_unique_per_document() {
        let doc = Document::new();
        let other = doc.clone();
        assert_eq!(doc.next_id("modal"), "modal-1");
        assert_eq!(other.next_id("modal"), "modal-2");
        assert_eq!(Document::new().next_id("modal"), "modal-1");
    }

    #[test]
    fn test_stylesheet_marker() {
        let doc = Document::new();
        assert!(!doc.has_stylesheet("data-x"));
        doc.add_stylesheet(StyleSheet::tagged("data-x", "body {}"));
        assert!(doc.has_stylesheet("data-x"));
        assert_eq!(doc.stylesheets().len(), 1);
    }
}
