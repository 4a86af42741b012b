//! # spark-composite
//!
//! Roving-tabindex composite navigation for Rust UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! A composite is a root plus any number of items. Exactly one item is the
//! tab stop at a time; arrow keys (and optionally Home/End) move that stop
//! through the items in document order, skipping disabled ones:
//!
//! ```text
//! Items mount → Registry (document order) → indices
//!                                         ↘
//! KeyboardEvent → navigation transition → highlighted index → focus microtask
//! ```
//!
//! Items are never asked for their index: the registry derives it from the
//! host's document order, so reordering or inserting elements needs no
//! bookkeeping by the items themselves.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Orientation, TextDirection, ItemSize, attribute names)
//! - [`engine`] - Dom trait, in-memory Document, collection registry, microtasks
//! - [`state`] - Keyboard events, navigation config and transition, grid math, scroll math
//! - [`primitives`] - CompositeRoot, CompositeList and their item bindings
//! - [`error`] - CompositeError

pub mod engine;
pub mod error;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{CompositeError, Result};

pub use engine::{
    clear_microtasks, pending_microtasks, queue_microtask, run_microtasks, CollectionRegistry,
    Document, Dom, ElementId, OrderedView, RegistryEntry, TextInputState,
};

pub use primitives::{
    use_composite_item, use_composite_list_item, Cleanup, CompositeItem, CompositeItemProps,
    CompositeList, CompositeRoot, CompositeRootProps, DisabledIndices, IndexGuessBehavior,
    ListItemBinding, ListItemProps, PropValue,
};

pub use state::{
    // Keyboard
    KeyboardEvent, KeyState, ModifierKeys, Modifiers,
    // Navigation
    caret_allows_navigation, next_highlighted_index, NavigationConfig, NavigationRequest,
    // Highlight
    HighlightChangeCallback, HighlightedIndexSource,
};
