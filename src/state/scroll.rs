//! Scroll math for bringing a highlighted item into view.
//!
//! One axis at a time: given a viewport (current offset + length) and a
//! target span in content coordinates, compute the offset that reveals the
//! target while moving as little as possible. Which container scrolls and
//! how it is rendered stays with the host's [`Dom`](crate::engine::Dom).

/// Smallest offset change that makes `[target_start, target_start + target_len)`
/// visible in a viewport of `viewport_len` currently scrolled to `current`.
///
/// - Target already fully visible: offset unchanged.
/// - Target above/left of the viewport: align its start edge.
/// - Target below/right: align its end edge, unless it is larger than the
///   viewport, in which case its start edge wins.
///
/// The result is never negative.
pub fn reveal_offset(current: i32, viewport_len: i32, target_start: i32, target_len: i32) -> i32 {
    let viewport_len = viewport_len.max(0);
    let target_len = target_len.max(0);
    let target_end = target_start.saturating_add(target_len);
    let viewport_end = current.saturating_add(viewport_len);

    let next = if target_start < current {
        target_start
    } else if target_end > viewport_end {
        if target_len > viewport_len {
            target_start
        } else {
            target_end - viewport_len
        }
    } else {
        current
    };

    next.max(0)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_target_keeps_offset() {
        assert_eq!(reveal_offset(10, 30, 15, 10), 10);
        assert_eq!(reveal_offset(10, 30, 10, 30), 10);
    }

    #[test]
    fn test_target_before_viewport_aligns_start() {
        assert_eq!(reveal_offset(40, 30, 20, 10), 20);
    }

    #[test]
    fn test_target_after_viewport_aligns_end() {
        assert_eq!(reveal_offset(0, 30, 50, 10), 30);
    }

    #[test]
    fn test_oversized_target_aligns_start() {
        assert_eq!(reveal_offset(0, 30, 50, 100), 50);
    }

    #[test]
    fn test_never_negative() {
        assert_eq!(reveal_offset(5, 30, -10, 5), 0);
    }
}
