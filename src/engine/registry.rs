//! Collection Registry - Ordered membership of a composite's items.
//!
//! Items register `(element, metadata)` pairs in whatever order they mount.
//! The registry owns the authoritative ordering: a memoized view sorted by
//! document position, from which every item's index is derived.
//!
//! - Registering an element twice with equal metadata is a no-op.
//! - Mutations inside [`CollectionRegistry::batch`] coalesce into one
//!   recomputation.
//! - Listeners receive each new ordered view once. A listener that mutates
//!   the registry schedules another pass instead of re-entering the flush.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::document::{Dom, ElementId};

/// Upper bound on listener passes per flush. Listeners that keep mutating the
/// registry past this are cut off.
pub const MAX_FLUSH_PASSES: usize = 32;

// =============================================================================
// Ordered View
// =============================================================================

/// One registered item, at its document-order index.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry<M> {
    pub element: ElementId,
    pub index: usize,
    pub metadata: Option<M>,
    pub label: Option<String>,
}

/// Snapshot of the registry in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedView<M> {
    entries: Vec<RegistryEntry<M>>,
    positions: HashMap<ElementId, usize>,
}

impl<M> Default for OrderedView<M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<M> OrderedView<M> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RegistryEntry<M>> {
        self.entries.get(index)
    }

    /// Index of `element`, or `None` if it is not registered.
    pub fn index_of(&self, element: ElementId) -> Option<usize> {
        self.positions.get(&element).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry<M>> {
        self.entries.iter()
    }

    /// Elements in document order.
    pub fn elements(&self) -> Vec<ElementId> {
        self.entries.iter().map(|entry| entry.element).collect()
    }

    /// Labels in document order (`None` where an item has no label).
    pub fn labels(&self) -> Vec<Option<String>> {
        self.entries.iter().map(|entry| entry.label.clone()).collect()
    }
}

// =============================================================================
// Registry
// =============================================================================

type Listener<M> = Rc<dyn Fn(&Rc<OrderedView<M>>)>;

struct Registration<M> {
    metadata: Option<M>,
    label: Option<String>,
}

struct RegistryInner<M> {
    dom: Rc<dyn Dom>,
    entries: HashMap<ElementId, Registration<M>>,
    view: Rc<OrderedView<M>>,
    view_stale: bool,
    /// Last view handed to listeners.
    notified: Rc<OrderedView<M>>,
    pending: bool,
    listeners: Vec<(usize, Listener<M>)>,
    next_listener_id: usize,
    batch_depth: usize,
    notifying: bool,
}

impl<M: Clone + PartialEq + 'static> RegistryInner<M> {
    fn mark_dirty(&mut self) {
        self.view_stale = true;
        self.pending = true;
    }

    fn ordered_view(&mut self) -> Rc<OrderedView<M>> {
        if self.view_stale {
            let mut elements: Vec<ElementId> = self.entries.keys().copied().collect();
            self.dom.sort_in_document_order(&mut elements);

            let mut entries = Vec::with_capacity(elements.len());
            let mut positions = HashMap::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                let registration = &self.entries[&element];
                positions.insert(element, index);
                entries.push(RegistryEntry {
                    element,
                    index,
                    metadata: registration.metadata.clone(),
                    label: registration.label.clone(),
                });
            }

            trace!(len = entries.len(), "recomputed ordered view");
            self.view = Rc::new(OrderedView { entries, positions });
            self.view_stale = false;
        }
        Rc::clone(&self.view)
    }
}

/// Registry of a composite's items, keyed by element.
///
/// Cloning yields another handle to the same registry.
pub struct CollectionRegistry<M> {
    inner: Rc<RefCell<RegistryInner<M>>>,
}

impl<M> Clone for CollectionRegistry<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M> fmt::Debug for CollectionRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("CollectionRegistry")
            .field("len", &inner.entries.len())
            .field("listeners", &inner.listeners.len())
            .field("batch_depth", &inner.batch_depth)
            .finish()
    }
}

impl<M: Clone + PartialEq + 'static> CollectionRegistry<M> {
    /// Create an empty registry ordering elements through `dom`.
    pub fn new(dom: Rc<dyn Dom>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                dom,
                entries: HashMap::new(),
                view: Rc::new(OrderedView::default()),
                view_stale: false,
                notified: Rc::new(OrderedView::default()),
                pending: false,
                listeners: Vec::new(),
                next_listener_id: 0,
                batch_depth: 0,
                notifying: false,
            })),
        }
    }

    /// Add or update an element. Keeps any label set earlier.
    pub fn register(&self, element: ElementId, metadata: Option<M>) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let label = inner
                .entries
                .get(&element)
                .and_then(|existing| existing.label.clone());
            Self::upsert(&mut inner, element, metadata, label)
        };
        if changed {
            self.flush();
        }
    }

    /// Add or update an element together with its typeahead label.
    pub fn register_with_label(&self, element: ElementId, metadata: Option<M>, label: Option<String>) {
        let changed = Self::upsert(&mut self.inner.borrow_mut(), element, metadata, label);
        if changed {
            self.flush();
        }
    }

    fn upsert(
        inner: &mut RegistryInner<M>,
        element: ElementId,
        metadata: Option<M>,
        label: Option<String>,
    ) -> bool {
        if let Some(existing) = inner.entries.get(&element)
            && existing.metadata == metadata
            && existing.label == label
        {
            return false;
        }
        trace!(?element, "register");
        inner.entries.insert(element, Registration { metadata, label });
        inner.mark_dirty();
        true
    }

    /// Remove an element. Unknown elements are ignored.
    pub fn unregister(&self, element: ElementId) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let removed = inner.entries.remove(&element).is_some();
            if removed {
                trace!(?element, "unregister");
                inner.mark_dirty();
            }
            removed
        };
        if removed {
            self.flush();
        }
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.inner.borrow().entries.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Current entries in document order. Recomputed only after a mutation.
    pub fn ordered_view(&self) -> Rc<OrderedView<M>> {
        self.inner.borrow_mut().ordered_view()
    }

    /// Re-sort after the host moved elements without re-registering them.
    pub fn invalidate(&self) {
        self.inner.borrow_mut().mark_dirty();
        self.flush();
    }

    /// Subscribe to recomputations. Returns a cleanup function that
    /// unsubscribes.
    pub fn on_change<F>(&self, listener: F) -> impl FnOnce() + use<M, F>
    where
        F: Fn(&Rc<OrderedView<M>>) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            let listener: Listener<M> = Rc::new(listener);
            inner.listeners.push((id, listener));
            id
        };

        let weak: Weak<RefCell<RegistryInner<M>>> = Rc::downgrade(&self.inner);
        move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
            }
        }
    }

    /// Run `f` with notifications deferred; listeners see one recomputation
    /// when the outermost batch ends.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.borrow_mut().batch_depth += 1;

        struct BatchGuard<'a, M: Clone + PartialEq + 'static>(&'a CollectionRegistry<M>);
        impl<M: Clone + PartialEq + 'static> Drop for BatchGuard<'_, M> {
            fn drop(&mut self) {
                let depth = {
                    let mut inner = self.0.inner.borrow_mut();
                    inner.batch_depth -= 1;
                    inner.batch_depth
                };
                if depth == 0 {
                    self.0.flush();
                }
            }
        }

        let _guard = BatchGuard(self);
        f()
    }

    fn flush(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.batch_depth > 0 || inner.notifying {
                return;
            }
            inner.notifying = true;
        }

        let mut passes = 0;
        loop {
            let (view, listeners) = {
                let mut inner = self.inner.borrow_mut();
                if !inner.pending {
                    break;
                }
                inner.pending = false;
                if passes >= MAX_FLUSH_PASSES {
                    warn!(passes, "registry listeners keep mutating the registry; dropping further passes");
                    break;
                }
                let view = inner.ordered_view();
                if view == inner.notified {
                    continue;
                }
                inner.notified = Rc::clone(&view);
                let listeners: Vec<Listener<M>> =
                    inner.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
                (view, listeners)
            };

            passes += 1;
            for listener in listeners {
                listener(&view);
            }
        }

        self.inner.borrow_mut().notifying = false;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Document;
    use std::cell::Cell;

    fn setup(count: usize) -> (Rc<Document>, Vec<ElementId>) {
        let doc = Rc::new(Document::new());
        let list = doc.create_element("ul");
        doc.append_child(doc.root(), list);
        let items = (0..count)
            .map(|_| {
                let li = doc.create_element("li");
                doc.append_child(list, li);
                li
            })
            .collect();
        (doc, items)
    }

    #[test]
    fn test_view_follows_document_order() {
        let (doc, items) = setup(3);
        let registry: CollectionRegistry<()> = CollectionRegistry::new(doc.clone());

        registry.register(items[2], None);
        registry.register(items[0], None);
        registry.register(items[1], None);

        assert_eq!(registry.ordered_view().elements(), items);
        assert_eq!(registry.ordered_view().index_of(items[2]), Some(2));
    }

    #[test]
    fn test_idempotent_registration() {
        let (doc, items) = setup(3);
        let registry: CollectionRegistry<u32> = CollectionRegistry::new(doc.clone());
        registry.batch(|| {
            for (i, &item) in items.iter().enumerate() {
                registry.register(item, Some(i as u32));
            }
        });
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let _stop = registry.on_change(move |_| calls_clone.set(calls_clone.get() + 1));

        registry.register(items[1], Some(1));
        assert_eq!(calls.get(), 0);

        registry.register(items[1], Some(8));
        assert_eq!(calls.get(), 1);
        let view = registry.ordered_view();
        assert_eq!(view.index_of(items[1]), Some(1));
        assert_eq!(view.get(1).and_then(|e| e.metadata), Some(8));
        assert_eq!(view.elements(), items);
    }

    #[test]
    fn test_view_is_memoized() {
        let (doc, items) = setup(2);
        let registry: CollectionRegistry<()> = CollectionRegistry::new(doc.clone());
        registry.register(items[0], None);

        let a = registry.ordered_view();
        let b = registry.ordered_view();
        assert!(Rc::ptr_eq(&a, &b));

        registry.register(items[1], None);
        assert!(!Rc::ptr_eq(&a, &registry.ordered_view()));
    }

    #[test]
    fn test_batch_coalesces_notifications() {
        let (doc, items) = setup(3);
        let registry: CollectionRegistry<()> = CollectionRegistry::new(doc.clone());
        let lens = Rc::new(RefCell::new(Vec::new()));
        let lens_clone = lens.clone();
        let _stop = registry.on_change(move |view| lens_clone.borrow_mut().push(view.len()));

        registry.batch(|| {
            for &item in &items {
                registry.register(item, None);
            }
        });

        assert_eq!(*lens.borrow(), vec![3]);
    }

    #[test]
    fn test_cleanup_unsubscribes() {
        let (doc, items) = setup(2);
        let registry: CollectionRegistry<()> = CollectionRegistry::new(doc.clone());
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let stop = registry.on_change(move |_| calls_clone.set(calls_clone.get() + 1));

        registry.register(items[0], None);
        stop();
        registry.register(items[1], None);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_listener_mutation_runs_another_pass() {
        let (doc, items) = setup(2);
        let registry: CollectionRegistry<()> = CollectionRegistry::new(doc.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let reg = registry.clone();
        let second = items[1];
        let seen_clone = seen.clone();
        let _stop = registry.on_change(move |view| {
            seen_clone.borrow_mut().push(view.len());
            if view.len() == 1 {
                reg.register(second, None);
            }
        });

        registry.register(items[0], None);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_unregister_and_labels() {
        let (doc, items) = setup(2);
        let registry: CollectionRegistry<()> = CollectionRegistry::new(doc.clone());
        registry.register_with_label(items[0], None, Some("Apple".into()));
        registry.register_with_label(items[1], None, Some("Banana".into()));

        registry.unregister(items[0]);
        registry.unregister(items[0]);

        let view = registry.ordered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view.labels(), vec![Some("Banana".to_string())]);
        assert_eq!(view.index_of(items[0]), None);
    }
}
