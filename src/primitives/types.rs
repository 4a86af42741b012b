//! Primitive types - Props for roots and items.
//!
//! Props that may change over time accept a [`PropValue`]: a static value,
//! a signal, or a getter. Reads happen at use time, so a signal-backed prop
//! is always current (and tracked when read inside an effect).

use std::fmt;
use std::rc::Rc;

use spark_signals::Signal;

use crate::engine::ElementId;
use crate::state::highlight::HighlightChangeCallback;
use crate::state::navigation::NavigationConfig;
use crate::types::ItemSize;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by subscriptions.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Prop Value
// =============================================================================

/// A prop that can be static, reactive or computed.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal (changes propagate automatically).
    Signal(Signal<T>),
    /// Getter function (called each time value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value (for immediate reads).
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> fmt::Debug for PropValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(_) => f.write_str("PropValue::Static"),
            PropValue::Signal(_) => f.write_str("PropValue::Signal"),
            PropValue::Getter(_) => f.write_str("PropValue::Getter"),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

// =============================================================================
// Disabled Indices
// =============================================================================

/// Explicit disabled set. When given, it replaces the DOM's
/// `disabled` / `aria-disabled` attributes as the source of truth.
#[derive(Clone)]
pub enum DisabledIndices {
    List(Vec<usize>),
    Getter(Rc<dyn Fn(usize) -> bool>),
}

impl DisabledIndices {
    pub fn contains(&self, index: usize) -> bool {
        match self {
            DisabledIndices::List(indices) => indices.contains(&index),
            DisabledIndices::Getter(is_disabled) => is_disabled(index),
        }
    }
}

impl fmt::Debug for DisabledIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisabledIndices::List(indices) => f.debug_tuple("List").field(indices).finish(),
            DisabledIndices::Getter(_) => f.write_str("Getter"),
        }
    }
}

impl From<Vec<usize>> for DisabledIndices {
    fn from(indices: Vec<usize>) -> Self {
        DisabledIndices::List(indices)
    }
}

// =============================================================================
// Root Props
// =============================================================================

/// Properties for a [`CompositeRoot`](super::CompositeRoot).
///
/// # Example
///
/// ```ignore
/// use spark_composite::primitives::{CompositeRoot, CompositeRootProps};
/// use spark_composite::state::NavigationConfig;
///
/// let root: CompositeRoot<()> = CompositeRoot::new(dom, CompositeRootProps {
///     config: NavigationConfig { cols: 3, ..Default::default() },
///     disabled_indices: Some(vec![4].into()),
///     ..Default::default()
/// });
/// ```
#[derive(Clone)]
pub struct CompositeRootProps {
    pub config: NavigationConfig,
    /// Controlled highlighted index. When set, the root never stores the
    /// index itself and `on_highlighted_index_change` receives requests.
    pub highlighted_index: Option<PropValue<Option<usize>>>,
    /// Initial index when uncontrolled.
    pub default_highlighted_index: Option<usize>,
    pub on_highlighted_index_change: Option<HighlightChangeCallback>,
    pub disabled_indices: Option<DisabledIndices>,
    /// Per-item cell sizes for grids with items spanning several cells.
    pub item_sizes: Option<Vec<ItemSize>>,
    /// Element the root renders; receives `aria-orientation`.
    pub root_element: Option<ElementId>,
}

impl Default for CompositeRootProps {
    fn default() -> Self {
        Self {
            config: NavigationConfig::default(),
            highlighted_index: None,
            default_highlighted_index: Some(0),
            on_highlighted_index_change: None,
            disabled_indices: None,
            item_sizes: None,
            root_element: None,
        }
    }
}

impl CompositeRootProps {
    /// Props with the given navigation config and defaults for the rest.
    pub fn from_config(config: NavigationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }
}

impl fmt::Debug for CompositeRootProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeRootProps")
            .field("config", &self.config)
            .field("highlighted_index", &self.highlighted_index)
            .field("default_highlighted_index", &self.default_highlighted_index)
            .field("disabled_indices", &self.disabled_indices)
            .field("item_sizes", &self.item_sizes)
            .field("root_element", &self.root_element)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Item Props
// =============================================================================

/// What index an item reports before the registry has placed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexGuessBehavior {
    /// No index until the registry confirms one.
    #[default]
    None,
    /// Guess from mount order, so the first render already has the right
    /// tab stop in the common append-only case.
    GuessFromOrder,
}

/// Properties for list items and composite items.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItemProps<M> {
    pub metadata: Option<M>,
    /// Text used for typeahead matching.
    pub label: Option<String>,
    pub index_guess_behavior: IndexGuessBehavior,
    /// Element holding the item's display text; published to the list when
    /// the item lands at index 0.
    pub text_element: Option<ElementId>,
}

impl<M> Default for ListItemProps<M> {
    fn default() -> Self {
        Self {
            metadata: None,
            label: None,
            index_guess_behavior: IndexGuessBehavior::None,
            text_element: None,
        }
    }
}

/// Composite items take the same props as list items.
pub type CompositeItemProps<M> = ListItemProps<M>;
