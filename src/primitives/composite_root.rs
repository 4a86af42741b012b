//! Composite root - keyboard navigation over a list or grid of items.
//!
//! The root owns the list its items register with, the highlighted index
//! (or a mirror of the host's), and the key handler that moves it:
//!
//! ```text
//! keydown ─► relevant? ─► modifiers ok? ─► caret at edge? ─► next index
//!                                                             │
//!            set highlight + scroll ◄───────────────────────┘
//!            queue microtask: focus the highlighted element
//! ```
//!
//! Two reactive side channels run for the root's lifetime:
//!
//! - an effect over the highlighted index that pulls focus along when focus
//!   is already inside the composite (covers programmatic highlight changes)
//! - a registry listener that keeps the highlight on a live, enabled item as
//!   items unmount, and highlights the item carrying
//!   `data-composite-item-active` on the first non-empty render

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::effect;
use tracing::{debug, trace};

use crate::engine::{Dom, ElementId, OrderedView, queue_microtask};
use crate::state::highlight::HighlightedIndexSource;
use crate::state::keyboard::KeyboardEvent;
use crate::state::navigation::{
    NavigationConfig, NavigationRequest, caret_allows_navigation, nearest_enabled_index, next_highlighted_index,
};
use crate::types::{ACTIVE_ITEM_ATTR, ItemSize, Orientation};

use super::composite_list::CompositeList;
use super::context;
use super::types::{Cleanup, CompositeRootProps, DisabledIndices};

/// Navigation root. Create with [`CompositeRoot::new`], then create items
/// inside [`CompositeRoot::provide`].
pub struct CompositeRoot<M: Clone + PartialEq + 'static> {
    dom: Rc<dyn Dom>,
    list: Rc<CompositeList<M>>,
    highlighted: HighlightedIndexSource,
    config: RefCell<NavigationConfig>,
    disabled_indices: RefCell<Option<DisabledIndices>>,
    item_sizes: RefCell<Option<Vec<ItemSize>>>,
    root_element: Cell<Option<ElementId>>,
    initial_active_checked: Cell<bool>,
    /// Item count at the last recomputation.
    known_len: Cell<usize>,
    /// The highlight was cleared because no enabled item remained.
    highlight_dropped: Cell<bool>,
    cleanups: RefCell<Vec<Cleanup>>,
}

impl<M: Clone + PartialEq + 'static> fmt::Debug for CompositeRoot<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRoot")
            .field("config", &self.config.borrow())
            .field("highlighted", &self.highlighted)
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}

impl<M: Clone + PartialEq + 'static> CompositeRoot<M> {
    pub fn new(dom: Rc<dyn Dom>, props: CompositeRootProps) -> Rc<Self> {
        let CompositeRootProps {
            config,
            highlighted_index,
            default_highlighted_index,
            on_highlighted_index_change,
            disabled_indices,
            item_sizes,
            root_element,
        } = props;

        let highlighted = match highlighted_index {
            Some(prop) => HighlightedIndexSource::external(Rc::new(move || prop.get()), on_highlighted_index_change),
            None => HighlightedIndexSource::owned(default_highlighted_index, on_highlighted_index_change),
        };

        debug!(
            cols = config.cols,
            orientation = ?config.orientation,
            controlled = highlighted.is_controlled(),
            "composite root created"
        );

        let root = Rc::new(Self {
            list: CompositeList::new(Rc::clone(&dom)),
            dom,
            highlighted,
            config: RefCell::new(config),
            disabled_indices: RefCell::new(disabled_indices),
            item_sizes: RefCell::new(item_sizes),
            root_element: Cell::new(None),
            initial_active_checked: Cell::new(false),
            known_len: Cell::new(0),
            highlight_dropped: Cell::new(false),
            cleanups: RefCell::new(Vec::new()),
        });

        root.set_root_element(root_element);
        root.connect();
        root
    }

    fn connect(self: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let stop_listening = self.list.registry().on_change(move |view| {
            if let Some(root) = weak.upgrade() {
                root.reconcile_highlight(view);
                root.check_initial_active_item(view);
            }
        });

        let weak: Weak<Self> = Rc::downgrade(self);
        let source = self.highlighted.clone();
        let stop_effect = effect(move || {
            let _ = source.get();
            let weak = weak.clone();
            queue_microtask(move || {
                if let Some(root) = weak.upgrade() {
                    root.sync_focus_with_highlight();
                }
            });
        });

        let mut cleanups = self.cleanups.borrow_mut();
        cleanups.push(Box::new(stop_listening));
        cleanups.push(Box::new(stop_effect));
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn dom(&self) -> &Rc<dyn Dom> {
        &self.dom
    }

    pub fn list(&self) -> &Rc<CompositeList<M>> {
        &self.list
    }

    /// Registered elements in document order.
    pub fn elements(&self) -> Vec<ElementId> {
        self.list.registry().ordered_view().elements()
    }

    pub fn config(&self) -> NavigationConfig {
        self.config.borrow().clone()
    }

    pub fn set_config(&self, config: NavigationConfig) {
        *self.config.borrow_mut() = config;
        if let Some(element) = self.root_element.get() {
            self.write_root_attributes(element);
        }
    }

    pub fn set_disabled_indices(&self, disabled_indices: Option<DisabledIndices>) {
        *self.disabled_indices.borrow_mut() = disabled_indices;
    }

    pub fn set_item_sizes(&self, item_sizes: Option<Vec<ItemSize>>) {
        *self.item_sizes.borrow_mut() = item_sizes;
    }

    pub fn root_element(&self) -> Option<ElementId> {
        self.root_element.get()
    }

    /// Attach the element the root renders; it receives `aria-orientation`.
    pub fn set_root_element(&self, element: Option<ElementId>) {
        self.root_element.set(element);
        if let Some(element) = element {
            self.write_root_attributes(element);
        }
    }

    fn write_root_attributes(&self, element: ElementId) {
        match self.config.borrow().orientation {
            Orientation::Both => self.dom.remove_attribute(element, "aria-orientation"),
            Orientation::Horizontal => self.dom.set_attribute(element, "aria-orientation", "horizontal"),
            Orientation::Vertical => self.dom.set_attribute(element, "aria-orientation", "vertical"),
        }
    }

    // =========================================================================
    // Highlight
    // =========================================================================

    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighted.get()
    }

    /// Request a new highlighted index, optionally scrolling its element
    /// into view.
    ///
    /// The index is taken as given: an index past the end or on a disabled
    /// item leaves the composite without a tab stop until the next key press
    /// or the next time the item list shrinks.
    pub fn set_highlighted_index(&self, index: Option<usize>, scroll_into_view: bool) {
        trace!(?index, scroll_into_view, "set highlighted index");
        if let Some(index) = index {
            let len = self.list.registry().len();
            if index >= len || self.is_index_disabled(index) {
                debug!(index, len, "highlighted index is disabled or out of range");
            }
        }
        self.highlighted.set(index);
        if !scroll_into_view {
            return;
        }
        let view = self.list.registry().ordered_view();
        if let Some(entry) = index.and_then(|index| view.get(index)) {
            let orientation = self.config.borrow().orientation;
            self.dom.scroll_into_view(entry.element, orientation);
        }
    }

    /// Is item `index` disabled? An explicit disabled set wins over the DOM;
    /// indices with no registered element count as disabled.
    pub fn is_index_disabled(&self, index: usize) -> bool {
        let view = self.list.registry().ordered_view();
        self.is_disabled_in(&view, index)
    }

    fn is_disabled_in(&self, view: &OrderedView<M>, index: usize) -> bool {
        match &*self.disabled_indices.borrow() {
            Some(disabled) => disabled.contains(index),
            None => view
                .get(index)
                .is_none_or(|entry| self.dom.is_disabled(entry.element)),
        }
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Handle a key press dispatched to the root or one of its items.
    ///
    /// Returns true when the highlighted index changed. Handled keys get
    /// `prevent_default` (and `stop_propagation` when configured); ignored
    /// keys are left untouched for the host.
    pub fn handle_key_down(self: &Rc<Self>, event: &KeyboardEvent) -> bool {
        if !event.is_key_down() {
            return false;
        }

        let config = self.config();
        if !config.is_relevant_key(&event.key) {
            return false;
        }
        if event.has_disallowed_modifier(config.modifier_keys) {
            trace!(key = %event.key, modifiers = ?event.modifiers, "modifier held; not navigating");
            return false;
        }
        if let Some(target) = event.target
            && !self.dom.is_disabled(target)
            && let Some(input) = self.dom.text_input(target)
            && !caret_allows_navigation(&config, &event.key, &input, event.shift_key())
        {
            trace!(key = %event.key, "caret movement inside text control");
            return false;
        }

        let view = self.list.registry().ordered_view();
        let highlighted = self.highlighted.get();
        let next = {
            let item_sizes = self.item_sizes.borrow();
            next_highlighted_index(
                &NavigationRequest {
                    key: &event.key,
                    config: &config,
                    highlighted,
                    len: view.len(),
                    item_sizes: item_sizes.as_deref(),
                },
                &|index: usize| self.is_disabled_in(&view, index),
            )
        };

        let Some(next) = next else {
            trace!(key = %event.key, ?highlighted, "navigation is a no-op");
            return false;
        };

        if config.stop_event_propagation {
            event.stop_propagation();
        }
        event.prevent_default();

        debug!(key = %event.key, from = ?highlighted, to = next, "navigate");
        self.set_highlighted_index(Some(next), true);

        let weak = Rc::downgrade(self);
        queue_microtask(move || {
            if let Some(root) = weak.upgrade() {
                root.focus_highlighted_item();
            }
        });
        true
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Focus the element at the current highlighted index.
    pub fn focus_highlighted_item(&self) -> bool {
        let view = self.list.registry().ordered_view();
        match self.highlighted.get().and_then(|index| view.get(index)) {
            Some(entry) => self.dom.focus(entry.element),
            None => false,
        }
    }

    /// Move focus to the highlighted element when focus is on a different
    /// item of this composite. Focus outside the composite is never stolen.
    fn sync_focus_with_highlight(&self) {
        let Some(active) = self.dom.active_element() else {
            return;
        };
        let view = self.list.registry().ordered_view();
        if view.index_of(active).is_none() {
            return;
        }
        if let Some(entry) = self.highlighted.get().and_then(|index| view.get(index))
            && entry.element != active
        {
            trace!(element = ?entry.element, "focus follows highlight");
            self.dom.focus(entry.element);
        }
    }

    /// Keep the highlight on a live, enabled item after the list shrinks.
    /// With nothing left to highlight the highlight is cleared, and the first
    /// enabled item takes it back once items mount again.
    fn reconcile_highlight(&self, view: &OrderedView<M>) {
        let previous_len = self.known_len.replace(view.len());
        let highlighted = self.highlighted.get();

        if view.len() >= previous_len {
            if highlighted.is_none() && self.highlight_dropped.get() && !view.is_empty() {
                self.highlight_dropped.set(false);
                let first = nearest_enabled_index(view.len(), 0, &|index: usize| self.is_disabled_in(view, index));
                debug!(?first, "restoring highlight after remount");
                self.set_highlighted_index(first, false);
            }
            return;
        }

        let Some(current) = highlighted else {
            return;
        };
        if current < view.len() && !self.is_disabled_in(view, current) {
            return;
        }
        let next = nearest_enabled_index(view.len(), current, &|index: usize| self.is_disabled_in(view, index));
        debug!(from = current, to = ?next, len = view.len(), "highlight moved after items left");
        self.highlight_dropped.set(next.is_none());
        self.set_highlighted_index(next, false);
    }

    fn check_initial_active_item(&self, view: &Rc<OrderedView<M>>) {
        if self.initial_active_checked.get() || view.is_empty() {
            return;
        }
        self.initial_active_checked.set(true);

        let mut active = view
            .iter()
            .filter(|entry| self.dom.has_attribute(entry.element, ACTIVE_ITEM_ATTR));
        if let (Some(entry), None) = (active.next(), active.next()) {
            debug!(index = entry.index, "highlighting initially active item");
            self.set_highlighted_index(Some(entry.index), true);
        }
    }

    // =========================================================================
    // Providing
    // =========================================================================

    /// Run `f` with this root (and its list) provided to items created
    /// inside it.
    pub fn provide<R>(self: &Rc<Self>, f: impl FnOnce() -> R) -> R {
        context::provide(Rc::clone(self), || self.list.provide(f))
    }

    /// Run `f` with registry notifications coalesced, e.g. while mounting a
    /// batch of items.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.list.registry().batch(f)
    }
}

impl<M: Clone + PartialEq + 'static> Drop for CompositeRoot<M> {
    fn drop(&mut self) {
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        for cleanup in cleanups {
            cleanup();
        }
    }
}
