//! State Module - Navigation state and the pure logic behind it
//!
//! - **Keyboard** - Key events, modifiers, key names
//! - **Navigation** - Config and the key → index transition
//! - **Grid** - Cell mapping and 2-D moves for multi-column composites
//! - **Highlight** - Owned or controlled highlighted index
//! - **Scroll** - Minimal scroll offsets for revealing an item

pub mod grid;
pub mod highlight;
pub mod keyboard;
pub mod navigation;
pub mod scroll;

pub use highlight::*;
pub use keyboard::*;
pub use navigation::*;
pub use scroll::*;
