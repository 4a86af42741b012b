//! List item binding - keeps one item's index in sync with the registry.
//!
//! ```text
//! mount            set_element(el)        registry recompute       drop
//!   │ guess index ──► register(el, meta) ──► index = view[el] ───► unregister
//! ```
//!
//! The index is a signal, so anything reading it inside an effect re-runs
//! when the item moves.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{Signal, signal};
use tracing::trace;

use crate::engine::ElementId;
use crate::error::Result;

use super::composite_list::CompositeList;
use super::context;
use super::types::{IndexGuessBehavior, ListItemProps};

/// An item's live connection to its list.
pub struct ListItemBinding<M: Clone + PartialEq + 'static> {
    list: Rc<CompositeList<M>>,
    index: Signal<Option<usize>>,
    element: Rc<Cell<Option<ElementId>>>,
    metadata: RefCell<Option<M>>,
    label: RefCell<Option<String>>,
    text_element: Option<ElementId>,
    stop_listening: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl<M: Clone + PartialEq + 'static> fmt::Debug for ListItemBinding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListItemBinding")
            .field("index", &self.index.get())
            .field("element", &self.element.get())
            .finish()
    }
}

/// Bind a list item to the nearest provided [`CompositeList`].
///
/// Fails with [`MissingContext`](crate::CompositeError::MissingContext) when
/// no list of this metadata type is being provided.
pub fn use_composite_list_item<M: Clone + PartialEq + 'static>(
    props: ListItemProps<M>,
) -> Result<ListItemBinding<M>> {
    let list = context::require_context::<CompositeList<M>>("use_composite_list_item", "CompositeList")?;
    Ok(ListItemBinding::new(list, props))
}

impl<M: Clone + PartialEq + 'static> ListItemBinding<M> {
    pub(crate) fn new(list: Rc<CompositeList<M>>, props: ListItemProps<M>) -> Self {
        let initial = match props.index_guess_behavior {
            IndexGuessBehavior::GuessFromOrder => Some(list.claim_index_guess()),
            IndexGuessBehavior::None => None,
        };
        let index = signal(initial);
        let element: Rc<Cell<Option<ElementId>>> = Rc::new(Cell::new(None));

        let listener_index = index.clone();
        let listener_element = Rc::clone(&element);
        let listener_list: Weak<CompositeList<M>> = Rc::downgrade(&list);
        let text_element = props.text_element;
        let stop = list.registry().on_change(move |view| {
            let Some(element) = listener_element.get() else {
                return;
            };
            let Some(position) = view.index_of(element) else {
                if listener_index.get().is_some() {
                    listener_index.set(None);
                }
                return;
            };
            if listener_index.get() != Some(position) {
                listener_index.set(Some(position));
            }
            if position == 0
                && let Some(text) = text_element
                && let Some(list) = listener_list.upgrade()
                && list.selected_item_text().is_none()
            {
                list.set_selected_item_text(Some(text));
            }
        });

        Self {
            list,
            index,
            element,
            metadata: RefCell::new(props.metadata),
            label: RefCell::new(props.label),
            text_element,
            stop_listening: RefCell::new(Some(Box::new(stop))),
        }
    }

    /// Current index: authoritative once registered, otherwise the guess.
    /// `None` again once the element detaches.
    pub fn index(&self) -> Option<usize> {
        self.index.get()
    }

    /// The index signal, for effects that follow the item's position.
    pub fn index_signal(&self) -> Signal<Option<usize>> {
        self.index.clone()
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element.get()
    }

    pub fn list(&self) -> &Rc<CompositeList<M>> {
        &self.list
    }

    /// Attach (or detach, with `None`) the rendered element. Attaching
    /// registers it; replacing or detaching unregisters the previous one.
    pub fn set_element(&self, element: Option<ElementId>) {
        let previous = self.element.get();
        if previous == element {
            return;
        }
        self.element.set(element);

        let registry = self.list.registry();
        registry.batch(|| {
            if let Some(previous) = previous {
                registry.unregister(previous);
            }
            if let Some(element) = element {
                trace!(?element, "list item attached");
                registry.register_with_label(element, self.metadata.borrow().clone(), self.label.borrow().clone());
            }
        });
        if element.is_none() {
            self.index.set(None);
        }
    }

    /// Replace the metadata, re-registering if attached.
    pub fn set_metadata(&self, metadata: Option<M>) {
        *self.metadata.borrow_mut() = metadata;
        self.reregister();
    }

    /// Replace the typeahead label, re-registering if attached.
    pub fn set_label(&self, label: Option<String>) {
        *self.label.borrow_mut() = label;
        self.reregister();
    }

    fn reregister(&self) {
        if let Some(element) = self.element.get() {
            self.list
                .registry()
                .register_with_label(element, self.metadata.borrow().clone(), self.label.borrow().clone());
        }
    }

    /// Leave the list. Also runs on drop.
    pub fn unmount(&self) {
        if let Some(stop) = self.stop_listening.borrow_mut().take() {
            stop();
        }
        if let Some(element) = self.element.take() {
            trace!(?element, "list item unmounted");
            self.list.registry().unregister(element);
        }
        if self.text_element.is_some() && self.list.selected_item_text() == self.text_element {
            self.list.set_selected_item_text(None);
        }
    }
}

impl<M: Clone + PartialEq + 'static> Drop for ListItemBinding<M> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Document, Dom};
    use crate::primitives::context::reset_context;

    fn setup(count: usize) -> (Rc<Document>, ElementId, Vec<ElementId>) {
        reset_context();
        let doc = Rc::new(Document::new());
        let ul = doc.create_element("ul");
        doc.append_child(doc.root(), ul);
        let items = (0..count)
            .map(|_| {
                let li = doc.create_element("li");
                doc.append_child(ul, li);
                li
            })
            .collect();
        (doc, ul, items)
    }

    #[test]
    fn test_missing_list_is_an_error() {
        reset_context();
        assert!(use_composite_list_item::<()>(ListItemProps::default()).is_err());
    }

    #[test]
    fn test_indices_follow_document_order() {
        let (doc, _, els) = setup(3);
        let list: Rc<CompositeList<()>> = CompositeList::new(doc.clone());

        let items: Vec<ListItemBinding<()>> = list.provide(|| {
            (0..3)
                .map(|_| use_composite_list_item(ListItemProps::default()).unwrap())
                .collect()
        });
        // Attach out of order.
        items[2].set_element(Some(els[2]));
        items[0].set_element(Some(els[0]));
        items[1].set_element(Some(els[1]));

        assert_eq!(items[0].index(), Some(0));
        assert_eq!(items[1].index(), Some(1));
        assert_eq!(items[2].index(), Some(2));
    }

    #[test]
    fn test_reorder_updates_indices() {
        let (doc, ul, els) = setup(2);
        let list: Rc<CompositeList<()>> = CompositeList::new(doc.clone());
        let a = ListItemBinding::new(list.clone(), ListItemProps::default());
        let b = ListItemBinding::new(list.clone(), ListItemProps::default());
        a.set_element(Some(els[0]));
        b.set_element(Some(els[1]));

        doc.insert_before(ul, els[1], Some(els[0]));
        list.registry().invalidate();

        assert_eq!(a.index(), Some(1));
        assert_eq!(b.index(), Some(0));
    }

    #[test]
    fn test_guess_from_order() {
        let (doc, _, _) = setup(0);
        let list: Rc<CompositeList<()>> = CompositeList::new(doc.clone());
        let guessing = ListItemProps {
            index_guess_behavior: IndexGuessBehavior::GuessFromOrder,
            ..Default::default()
        };

        let a = ListItemBinding::new(list.clone(), guessing.clone());
        let b = ListItemBinding::new(list.clone(), guessing.clone());
        let silent = ListItemBinding::new(list.clone(), ListItemProps::default());
        assert_eq!(a.index(), Some(0));
        assert_eq!(b.index(), Some(1));
        assert_eq!(silent.index(), None);

        list.reset_index_guesses();
        let c = ListItemBinding::new(list.clone(), guessing);
        assert_eq!(c.index(), Some(0));
    }

    #[test]
    fn test_drop_unregisters() {
        let (doc, _, els) = setup(2);
        let list: Rc<CompositeList<u8>> = CompositeList::new(doc.clone());
        let a = ListItemBinding::new(list.clone(), ListItemProps::default());
        let b = ListItemBinding::new(
            list.clone(),
            ListItemProps {
                metadata: Some(9),
                ..Default::default()
            },
        );
        a.set_element(Some(els[0]));
        b.set_element(Some(els[1]));
        assert_eq!(b.index(), Some(1));

        drop(a);
        assert_eq!(list.registry().len(), 1);
        assert_eq!(b.index(), Some(0));
        assert_eq!(list.registry().ordered_view().get(0).and_then(|e| e.metadata), Some(9));
        assert!(doc.is_connected(els[0]));
    }

    #[test]
    fn test_detached_item_loses_its_index() {
        let (doc, _, els) = setup(2);
        let list: Rc<CompositeList<()>> = CompositeList::new(doc.clone());
        let a = ListItemBinding::new(list.clone(), ListItemProps::default());
        let b = ListItemBinding::new(list.clone(), ListItemProps::default());
        a.set_element(Some(els[0]));
        b.set_element(Some(els[1]));

        a.set_element(None);
        assert_eq!(a.index(), None);
        assert_eq!(b.index(), Some(0));

        a.set_element(Some(els[0]));
        assert_eq!(a.index(), Some(0));
        assert_eq!(b.index(), Some(1));
    }

    #[test]
    fn test_externally_unregistered_item_loses_its_index() {
        let (doc, _, els) = setup(2);
        let list: Rc<CompositeList<()>> = CompositeList::new(doc.clone());
        let a = ListItemBinding::new(list.clone(), ListItemProps::default());
        let b = ListItemBinding::new(list.clone(), ListItemProps::default());
        a.set_element(Some(els[0]));
        b.set_element(Some(els[1]));

        list.registry().unregister(els[1]);
        assert_eq!(a.index(), Some(0));
        assert_eq!(b.index(), None);
    }

    #[test]
    fn test_text_element_published_at_index_zero() {
        let (doc, _, els) = setup(1);
        let span = doc.create_element("span");
        doc.append_child(els[0], span);
        let list: Rc<CompositeList<()>> = CompositeList::new(doc.clone());

        let item = ListItemBinding::new(
            list.clone(),
            ListItemProps {
                text_element: Some(span),
                ..Default::default()
            },
        );
        item.set_element(Some(els[0]));
        assert_eq!(list.selected_item_text(), Some(span));

        drop(item);
        assert_eq!(list.selected_item_text(), None);
    }
}
