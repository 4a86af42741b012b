//! Composite engine - the DOM abstraction and the item registry.
//!
//! - Document: the [`Dom`] trait the composite talks to, plus [`Document`],
//!   an in-memory element tree implementing it
//! - Registry: ordered membership of a composite's items
//! - Microtask: deferred focus work drained by the host
//!
//! # Architecture
//!
//! Elements are NOT objects. They are generation-checked handles into the
//! host's tree:
//!
//! ```text
//! ElementId { slot: 3, generation: 0 }  -> <li> (live)
//! ElementId { slot: 3, generation: 1 }  -> <li> (slot recycled, old handle stale)
//! ```
//!
//! The registry never stores indices for elements; indices are always derived
//! from document order when the ordered view is recomputed.

mod document;
mod microtask;
mod registry;

pub use document::*;
pub use microtask::*;
pub use registry::*;
