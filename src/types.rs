//! Core types for spark-composite.
//!
//! These types define the vocabulary shared by the registry, the navigation
//! state machine and the bindings: orientation, direction, grid item sizes,
//! geometry and the attribute names the engine reads and writes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Orientation / Direction
// =============================================================================

/// Which arrow keys a composite responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// ArrowLeft / ArrowRight only.
    Horizontal,
    /// ArrowUp / ArrowDown only.
    Vertical,
    /// All four arrow keys.
    #[default]
    Both,
}

impl Orientation {
    /// Does this orientation react to horizontal arrow keys?
    pub fn allows_horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Does this orientation react to vertical arrow keys?
    pub fn allows_vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

/// Writing direction of the composite. RTL mirrors horizontal movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }
}

// =============================================================================
// Grid Item Size
// =============================================================================

/// Size of a grid item in grid-cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemSize {
    pub width: usize,
    pub height: usize,
}

impl ItemSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// A single cell.
    pub const UNIT: Self = Self::new(1, 1);
}

impl Default for ItemSize {
    fn default() -> Self {
        Self::UNIT
    }
}

impl From<(usize, usize)> for ItemSize {
    fn from((width, height): (usize, usize)) -> Self {
        Self::new(width, height)
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned rectangle in host units (pixels, terminal cells, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

// =============================================================================
// Attribute Names
// =============================================================================

/// Native disabled attribute.
pub const DISABLED_ATTR: &str = "disabled";

/// ARIA disabled attribute; disabled when its value is `"true"`.
pub const ARIA_DISABLED_ATTR: &str = "aria-disabled";

/// Marks the item that should be highlighted when the composite first fills.
pub const ACTIVE_ITEM_ATTR: &str = "data-composite-item-active";

/// Written by item bindings on the highlighted item.
pub const HIGHLIGHTED_ATTR: &str = "data-highlighted";

/// Written by item bindings: `"0"` on the highlighted item, `"-1"` elsewhere.
pub const TAB_INDEX_ATTR: &str = "tabindex";
