//! Document model - the DOM surface the composite engine consumes.
//!
//! The engine never owns elements. It holds [`ElementId`] handles and asks a
//! [`Dom`] implementation about order, attributes, focus, text-control caret
//! state and scrolling. [`Document`] is the in-memory arena implementation
//! used by hosts without a real DOM (terminal UIs, tests).
//!
//! Element slots are recycled through a free pool, like component indices in
//! a parallel-array registry. Every reuse bumps the slot generation, so a
//! handle kept past `destroy()` never aliases the element that replaces it.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::state::scroll::reveal_offset;
use crate::types::{ARIA_DISABLED_ATTR, DISABLED_ATTR, Orientation, Rect};

// =============================================================================
// Element Handle
// =============================================================================

/// Opaque, generation-checked handle to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    slot: u32,
    generation: u32,
}

impl ElementId {
    /// Arena slot of this handle.
    pub fn slot(self) -> u32 {
        self.slot
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

// =============================================================================
// Text Control State
// =============================================================================

/// Value and selection of a native text-input-like control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInputState {
    pub value: String,
    /// `None` for controls that expose no selection (e.g. `type="number"`).
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
}

impl TextInputState {
    /// A control with a collapsed caret at `position` (in characters).
    pub fn with_caret(value: impl Into<String>, position: usize) -> Self {
        Self {
            value: value.into(),
            selection_start: Some(position),
            selection_end: Some(position),
        }
    }

    /// Length of the value in characters.
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Caret position when the selection is collapsed.
    pub fn caret(&self) -> Option<usize> {
        match (self.selection_start, self.selection_end) {
            (Some(start), Some(end)) if start == end => Some(start),
            _ => None,
        }
    }
}

// =============================================================================
// Dom Trait
// =============================================================================

/// DOM operations the composite engine needs from its host.
///
/// `compare_document_position` must be a total order: pre-order position for
/// connected elements, with disconnected or stale handles sorted after them
/// in some deterministic order.
pub trait Dom {
    fn compare_document_position(&self, a: ElementId, b: ElementId) -> Ordering;

    fn is_connected(&self, element: ElementId) -> bool;

    /// Is `node` equal to `ancestor` or one of its descendants?
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    fn get_attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&self, element: ElementId, name: &str, value: &str);

    fn remove_attribute(&self, element: ElementId, name: &str);

    /// Move focus to `element`. Returns false if it cannot take focus.
    fn focus(&self, element: ElementId) -> bool;

    fn active_element(&self) -> Option<ElementId>;

    /// Value/selection if `element` is a native text-input-like control.
    fn text_input(&self, element: ElementId) -> Option<TextInputState>;

    /// Bring `element` into its scroll container's viewport with minimal movement.
    fn scroll_into_view(&self, element: ElementId, orientation: Orientation);

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.get_attribute(element, name).is_some()
    }

    /// `disabled` attribute or `aria-disabled="true"`.
    fn is_disabled(&self, element: ElementId) -> bool {
        self.has_attribute(element, DISABLED_ATTR)
            || self.get_attribute(element, ARIA_DISABLED_ATTR).as_deref() == Some("true")
    }

    /// Sort `elements` into document order.
    fn sort_in_document_order(&self, elements: &mut [ElementId]) {
        elements.sort_by(|&a, &b| self.compare_document_position(a, b));
    }
}

// =============================================================================
// Document Arena
// =============================================================================

#[derive(Debug, Default)]
struct Node {
    tag: String,
    generation: u32,
    alive: bool,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: HashMap<String, String>,
    text_input: Option<TextInputState>,
    rect: Option<Rect>,
    scrollable: bool,
    scroll_offset: (i32, i32),
}

#[derive(Debug)]
struct DocumentInner {
    nodes: Vec<Node>,
    /// Pool of freed slots for reuse.
    free: Vec<usize>,
    active: Option<ElementId>,
}

/// Slot of the document root.
const ROOT_SLOT: usize = 0;

impl DocumentInner {
    fn live(&self, id: ElementId) -> Option<usize> {
        let slot = id.slot as usize;
        let node = self.nodes.get(slot)?;
        (node.alive && node.generation == id.generation).then_some(slot)
    }

    fn handle(&self, slot: usize) -> ElementId {
        ElementId {
            slot: slot as u32,
            generation: self.nodes[slot].generation,
        }
    }

    fn is_connected_slot(&self, mut slot: usize) -> bool {
        loop {
            if slot == ROOT_SLOT {
                return true;
            }
            match self.nodes[slot].parent {
                Some(parent) => slot = parent,
                None => return false,
            }
        }
    }

    /// Child positions from the root down to `slot`; `None` if disconnected.
    fn path(&self, slot: usize) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = slot;
        while current != ROOT_SLOT {
            let parent = self.nodes[current].parent?;
            let position = self.nodes[parent]
                .children
                .iter()
                .position(|&child| child == current)?;
            path.push(position);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Sort key: connected nodes by pre-order path, then everything else by handle.
    fn order_key(&self, id: ElementId) -> (u8, Vec<usize>, ElementId) {
        match self.live(id).and_then(|slot| self.path(slot)) {
            Some(path) => (0, path, id),
            None => (1, Vec::new(), id),
        }
    }

    fn contains_slot(&self, ancestor: usize, mut node: usize) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, slot: usize) {
        if let Some(parent) = self.nodes[slot].parent.take() {
            self.nodes[parent].children.retain(|&child| child != slot);
        }
        if let Some(active) = self.active
            && let Some(active_slot) = self.live(active)
            && self.contains_slot(slot, active_slot)
        {
            self.active = None;
        }
    }

    fn release(&mut self, slot: usize) {
        let children = std::mem::take(&mut self.nodes[slot].children);
        for child in children {
            self.nodes[child].parent = None;
            self.release(child);
        }
        let node = &mut self.nodes[slot];
        node.alive = false;
        node.generation = node.generation.wrapping_add(1);
        node.parent = None;
        node.attributes.clear();
        node.text_input = None;
        node.rect = None;
        node.scrollable = false;
        node.scroll_offset = (0, 0);
        self.free.push(slot);
    }
}

/// In-memory element tree implementing [`Dom`].
#[derive(Debug)]
pub struct Document {
    inner: RefCell<DocumentInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with only its root element.
    pub fn new() -> Self {
        let root = Node {
            tag: "#document".to_string(),
            alive: true,
            ..Node::default()
        };
        Self {
            inner: RefCell::new(DocumentInner {
                nodes: vec![root],
                free: Vec::new(),
                active: None,
            }),
        }
    }

    /// The document root. Always connected.
    pub fn root(&self) -> ElementId {
        self.inner.borrow().handle(ROOT_SLOT)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        let mut inner = self.inner.borrow_mut();
        let slot = match inner.free.pop() {
            Some(slot) => slot,
            None => {
                inner.nodes.push(Node::default());
                inner.nodes.len() - 1
            }
        };
        let node = &mut inner.nodes[slot];
        node.tag = tag.to_string();
        node.alive = true;
        inner.handle(slot)
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or last when `None`).
    ///
    /// Returns false for stale handles, a foreign reference, or when `child`
    /// contains `parent`.
    pub fn insert_before(
        &self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let (Some(parent_slot), Some(child_slot)) = (inner.live(parent), inner.live(child)) else {
            return false;
        };
        if child_slot == ROOT_SLOT || inner.contains_slot(child_slot, parent_slot) {
            return false;
        }
        let reference_slot = match reference {
            Some(reference) => match inner.live(reference) {
                Some(slot) if inner.nodes[slot].parent == Some(parent_slot) && slot != child_slot => {
                    Some(slot)
                }
                _ => return false,
            },
            None => None,
        };

        inner.detach(child_slot);
        let children = &mut inner.nodes[parent_slot].children;
        let position = reference_slot
            .and_then(|slot| children.iter().position(|&c| c == slot))
            .unwrap_or(children.len());
        children.insert(position, child_slot);
        inner.nodes[child_slot].parent = Some(parent_slot);
        true
    }

    /// Detach `element` (and its subtree) from its parent. The handle stays valid.
    pub fn remove(&self, element: ElementId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element)
            && slot != ROOT_SLOT
        {
            inner.detach(slot);
        }
    }

    /// Detach and free `element` and all its descendants.
    ///
    /// Handles to destroyed elements go stale; their slots are reused.
    pub fn destroy(&self, element: ElementId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element)
            && slot != ROOT_SLOT
        {
            inner.detach(slot);
            inner.release(slot);
        }
    }

    /// Is this handle still referring to a live element?
    pub fn is_alive(&self, element: ElementId) -> bool {
        self.inner.borrow().live(element).is_some()
    }

    pub fn tag(&self, element: ElementId) -> Option<String> {
        let inner = self.inner.borrow();
        inner.live(element).map(|slot| inner.nodes[slot].tag.clone())
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        let inner = self.inner.borrow();
        let slot = inner.live(element)?;
        inner.nodes[slot].parent.map(|parent| inner.handle(parent))
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        let inner = self.inner.borrow();
        match inner.live(element) {
            Some(slot) => inner.nodes[slot]
                .children
                .iter()
                .map(|&child| inner.handle(child))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Clear focus (no element active).
    pub fn blur(&self) {
        self.inner.borrow_mut().active = None;
    }

    /// Mark `element` as a native text control with the given value/selection.
    pub fn set_text_input(&self, element: ElementId, state: TextInputState) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element) {
            inner.nodes[slot].text_input = Some(state);
        }
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element) {
            inner.nodes[slot].rect = Some(rect);
        }
    }

    pub fn rect(&self, element: ElementId) -> Option<Rect> {
        let inner = self.inner.borrow();
        inner.live(element).and_then(|slot| inner.nodes[slot].rect)
    }

    /// Make `element` a scroll container.
    pub fn set_scrollable(&self, element: ElementId, scrollable: bool) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element) {
            inner.nodes[slot].scrollable = scrollable;
        }
    }

    /// Current (x, y) scroll offset of a scroll container.
    pub fn scroll_offset(&self, element: ElementId) -> (i32, i32) {
        let inner = self.inner.borrow();
        inner
            .live(element)
            .map(|slot| inner.nodes[slot].scroll_offset)
            .unwrap_or((0, 0))
    }

    pub fn set_scroll_offset(&self, element: ElementId, x: i32, y: i32) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element) {
            inner.nodes[slot].scroll_offset = (x.max(0), y.max(0));
        }
    }
}

impl Dom for Document {
    fn compare_document_position(&self, a: ElementId, b: ElementId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let inner = self.inner.borrow();
        inner.order_key(a).cmp(&inner.order_key(b))
    }

    fn is_connected(&self, element: ElementId) -> bool {
        let inner = self.inner.borrow();
        inner
            .live(element)
            .is_some_and(|slot| inner.is_connected_slot(slot))
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let inner = self.inner.borrow();
        match (inner.live(ancestor), inner.live(node)) {
            (Some(ancestor), Some(node)) => inner.contains_slot(ancestor, node),
            _ => false,
        }
    }

    fn get_attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let inner = self.inner.borrow();
        let slot = inner.live(element)?;
        inner.nodes[slot].attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element) {
            inner.nodes[slot]
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.live(element) {
            inner.nodes[slot].attributes.remove(name);
        }
    }

    fn focus(&self, element: ElementId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.live(element) {
            Some(slot) if slot != ROOT_SLOT && inner.is_connected_slot(slot) => {
                inner.active = Some(element);
                true
            }
            _ => false,
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        let inner = self.inner.borrow();
        inner.active.filter(|&active| inner.live(active).is_some())
    }

    fn text_input(&self, element: ElementId) -> Option<TextInputState> {
        let inner = self.inner.borrow();
        let slot = inner.live(element)?;
        inner.nodes[slot].text_input.clone()
    }

    fn scroll_into_view(&self, element: ElementId, orientation: Orientation) {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.live(element) else { return };
        let Some(target) = inner.nodes[slot].rect else { return };

        // Nearest scrollable ancestor with geometry.
        let mut current = inner.nodes[slot].parent;
        let container = loop {
            match current {
                Some(candidate) => {
                    let node = &inner.nodes[candidate];
                    if node.scrollable && node.rect.is_some() {
                        break candidate;
                    }
                    current = node.parent;
                }
                None => return,
            }
        };

        let Some(viewport) = inner.nodes[container].rect else { return };
        let (mut x, mut y) = inner.nodes[container].scroll_offset;
        if orientation.allows_horizontal() {
            x = reveal_offset(x, viewport.width, target.x - viewport.x, target.width);
        }
        if orientation.allows_vertical() {
            y = reveal_offset(y, viewport.height, target.y - viewport.y, target.height);
        }
        inner.nodes[container].scroll_offset = (x, y);
    }

    fn sort_in_document_order(&self, elements: &mut [ElementId]) {
        let inner = self.inner.borrow();
        elements.sort_by_cached_key(|&element| inner.order_key(element));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn list(doc: &Document, count: usize) -> (ElementId, Vec<ElementId>) {
        let parent = doc.create_element("ul");
        doc.append_child(doc.root(), parent);
        let items = (0..count)
            .map(|_| {
                let item = doc.create_element("li");
                doc.append_child(parent, item);
                item
            })
            .collect();
        (parent, items)
    }

    #[test]
    fn test_document_order_follows_tree() {
        let doc = Document::new();
        let (parent, items) = list(&doc, 3);

        assert_eq!(doc.compare_document_position(items[0], items[2]), Ordering::Less);
        assert_eq!(doc.compare_document_position(items[2], items[1]), Ordering::Greater);
        // Ancestor precedes descendant.
        assert_eq!(doc.compare_document_position(parent, items[0]), Ordering::Less);
    }

    #[test]
    fn test_insert_before_reorders() {
        let doc = Document::new();
        let (parent, items) = list(&doc, 3);

        assert!(doc.insert_before(parent, items[2], Some(items[0])));

        let mut sorted = items.clone();
        doc.sort_in_document_order(&mut sorted);
        assert_eq!(sorted, vec![items[2], items[0], items[1]]);
    }

    #[test]
    fn test_disconnected_sorts_after_connected() {
        let doc = Document::new();
        let (_, items) = list(&doc, 3);
        doc.remove(items[0]);

        assert!(!doc.is_connected(items[0]));
        let mut sorted = vec![items[0], items[2], items[1]];
        doc.sort_in_document_order(&mut sorted);
        assert_eq!(sorted, vec![items[1], items[2], items[0]]);
    }

    #[test]
    fn test_destroy_recycles_slot_with_new_generation() {
        let doc = Document::new();
        let first = doc.create_element("li");
        doc.destroy(first);

        let second = doc.create_element("li");
        assert_eq!(first.slot(), second.slot());
        assert_ne!(first, second);
        assert!(!doc.is_alive(first));
        assert!(doc.is_alive(second));
        assert_eq!(doc.get_attribute(first, "id"), None);
    }

    #[test]
    fn test_focus_requires_connection() {
        let doc = Document::new();
        let (_, items) = list(&doc, 2);
        let detached = doc.create_element("li");

        assert!(!doc.focus(detached));
        assert!(doc.focus(items[1]));
        assert_eq!(doc.active_element(), Some(items[1]));

        doc.remove(items[1]);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_cycle_insertion_rejected() {
        let doc = Document::new();
        let (parent, items) = list(&doc, 1);
        assert!(!doc.append_child(items[0], parent));
    }

    #[test]
    fn test_disabled_detection() {
        let doc = Document::new();
        let (_, items) = list(&doc, 3);
        doc.set_attribute(items[0], "disabled", "");
        doc.set_attribute(items[1], "aria-disabled", "true");
        doc.set_attribute(items[2], "aria-disabled", "false");

        assert!(doc.is_disabled(items[0]));
        assert!(doc.is_disabled(items[1]));
        assert!(!doc.is_disabled(items[2]));
    }

    #[test]
    fn test_scroll_into_view_moves_minimally() {
        let doc = Document::new();
        let (parent, items) = list(&doc, 10);
        doc.set_scrollable(parent, true);
        doc.set_rect(parent, Rect::new(0, 0, 100, 30));
        for (i, &item) in items.iter().enumerate() {
            doc.set_rect(item, Rect::new(0, i as i32 * 10, 100, 10));
        }

        // Already visible: no movement.
        doc.scroll_into_view(items[1], Orientation::Vertical);
        assert_eq!(doc.scroll_offset(parent), (0, 0));

        // Below the viewport: align bottom edge.
        doc.scroll_into_view(items[5], Orientation::Vertical);
        assert_eq!(doc.scroll_offset(parent), (0, 30));

        // Above the viewport: align top edge.
        doc.scroll_into_view(items[2], Orientation::Vertical);
        assert_eq!(doc.scroll_offset(parent), (0, 20));
    }
}
