//! Composite list - the provider list items register with.
//!
//! Wraps a [`CollectionRegistry`] with the per-list state items share: the
//! mount-order counter used for index guesses and the element holding the
//! first item's display text.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::engine::{CollectionRegistry, Dom, ElementId};

use super::context;

/// Shared list state, provided to items through the context stack.
pub struct CompositeList<M> {
    registry: CollectionRegistry<M>,
    next_guess: Cell<usize>,
    selected_item_text: Cell<Option<ElementId>>,
}

impl<M> fmt::Debug for CompositeList<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeList")
            .field("registry", &self.registry)
            .field("next_guess", &self.next_guess.get())
            .finish()
    }
}

impl<M: Clone + PartialEq + 'static> CompositeList<M> {
    pub fn new(dom: Rc<dyn Dom>) -> Rc<Self> {
        Rc::new(Self {
            registry: CollectionRegistry::new(dom),
            next_guess: Cell::new(0),
            selected_item_text: Cell::new(None),
        })
    }

    pub fn registry(&self) -> &CollectionRegistry<M> {
        &self.registry
    }

    /// Next mount-order index guess.
    pub fn claim_index_guess(&self) -> usize {
        let guess = self.next_guess.get();
        self.next_guess.set(guess + 1);
        guess
    }

    /// Restart guesses from 0, e.g. before a full re-render of the items.
    pub fn reset_index_guesses(&self) {
        trace!("reset index guesses");
        self.next_guess.set(0);
    }

    /// Text element of the item currently at index 0, when it published one.
    pub fn selected_item_text(&self) -> Option<ElementId> {
        self.selected_item_text.get()
    }

    pub fn set_selected_item_text(&self, element: Option<ElementId>) {
        self.selected_item_text.set(element);
    }

    /// Run `f` with this list provided to list items created inside it.
    pub fn provide<R>(self: &Rc<Self>, f: impl FnOnce() -> R) -> R {
        context::provide(Rc::clone(self), f)
    }
}
