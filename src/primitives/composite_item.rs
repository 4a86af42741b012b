//! Composite item - one roving-tabindex stop inside a [`CompositeRoot`].
//!
//! An item is a list item plus the root's highlight: it is the tab stop
//! (`tabindex=0`) exactly when its index is the highlighted one, and every
//! other item is `tabindex=-1`. Focus and hover feed back into the root.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::engine::ElementId;
use crate::error::Result;
use crate::types::{HIGHLIGHTED_ATTR, TAB_INDEX_ATTR};

use super::composite_root::CompositeRoot;
use super::context;
use super::list_item::ListItemBinding;
use super::types::CompositeItemProps;

/// An item's binding to its root.
pub struct CompositeItem<M: Clone + PartialEq + 'static> {
    root: Rc<CompositeRoot<M>>,
    item: ListItemBinding<M>,
}

impl<M: Clone + PartialEq + 'static> fmt::Debug for CompositeItem<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeItem")
            .field("item", &self.item)
            .field("highlighted", &self.is_highlighted())
            .finish()
    }
}

/// Bind an item to the nearest provided [`CompositeRoot`].
///
/// Fails with [`MissingContext`](crate::CompositeError::MissingContext)
/// outside of [`CompositeRoot::provide`].
pub fn use_composite_item<M: Clone + PartialEq + 'static>(props: CompositeItemProps<M>) -> Result<CompositeItem<M>> {
    let root = context::require_context::<CompositeRoot<M>>("use_composite_item", "CompositeRoot")?;
    let item = ListItemBinding::new(Rc::clone(root.list()), props);
    Ok(CompositeItem { root, item })
}

impl<M: Clone + PartialEq + 'static> CompositeItem<M> {
    pub fn index(&self) -> Option<usize> {
        self.item.index()
    }

    pub fn element(&self) -> Option<ElementId> {
        self.item.element()
    }

    /// Attach the rendered element and register it.
    pub fn set_element(&self, element: Option<ElementId>) {
        self.item.set_element(element);
    }

    pub fn set_metadata(&self, metadata: Option<M>) {
        self.item.set_metadata(metadata);
    }

    pub fn list_item(&self) -> &ListItemBinding<M> {
        &self.item
    }

    pub fn root(&self) -> &Rc<CompositeRoot<M>> {
        &self.root
    }

    pub fn is_highlighted(&self) -> bool {
        self.index()
            .is_some_and(|index| self.root.highlighted_index() == Some(index))
    }

    /// Roving tab stop: 0 for the highlighted item, -1 otherwise.
    pub fn tab_index(&self) -> i32 {
        if self.is_highlighted() { 0 } else { -1 }
    }

    /// The item received focus: highlight it without scrolling.
    pub fn handle_focus(&self) {
        if let Some(index) = self.index()
            && !self.is_highlighted()
        {
            self.root.set_highlighted_index(Some(index), false);
        }
    }

    /// Pointer moved over the item. With hover highlighting on, an enabled
    /// item that is not yet highlighted takes focus (and so the highlight).
    pub fn handle_mouse_move(&self) {
        if !self.root.config().highlight_item_on_hover || self.is_highlighted() {
            return;
        }
        let Some(element) = self.element() else {
            return;
        };
        let dom = self.root.dom();
        if dom.is_disabled(element) {
            return;
        }
        trace!(?element, "hover focus");
        if dom.focus(element) {
            self.handle_focus();
        }
    }

    /// Write `tabindex` and `data-highlighted` to the element.
    pub fn sync_attributes(&self) {
        let Some(element) = self.element() else {
            return;
        };
        let dom = self.root.dom();
        dom.set_attribute(element, TAB_INDEX_ATTR, &self.tab_index().to_string());
        if self.is_highlighted() {
            dom.set_attribute(element, HIGHLIGHTED_ATTR, "");
        } else {
            dom.remove_attribute(element, HIGHLIGHTED_ATTR);
        }
    }

    /// Leave the composite. Also runs on drop.
    pub fn unmount(&self) {
        self.item.unmount();
    }
}
