//! Primitives - Composite roots, lists and their item bindings.
//!
//! - [`CompositeList`] + [`use_composite_list_item`]: ordered membership
//! - [`CompositeRoot`] + [`use_composite_item`]: roving-tabindex navigation
//!
//! Bindings find their provider through the context stack, so they must be
//! created inside the provider's `provide` closure:
//!
//! ```ignore
//! let root: Rc<CompositeRoot<()>> = CompositeRoot::new(dom, CompositeRootProps::default());
//! let items = root.provide(|| {
//!     (0..3)
//!         .map(|_| use_composite_item(CompositeItemProps::default()))
//!         .collect::<Result<Vec<_>, _>>()
//! })?;
//! ```

pub mod context;
mod composite_item;
mod composite_list;
mod composite_root;
mod list_item;
mod types;

pub use composite_item::*;
pub use composite_list::*;
pub use composite_root::*;
pub use list_item::*;
pub use types::*;
