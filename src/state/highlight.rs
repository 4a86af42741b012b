//! Highlighted index storage - owned or controlled by the host.
//!
//! A root either owns its highlighted index (a signal seeded from the
//! default) or mirrors one the host controls. The navigation code reads and
//! writes through [`HighlightedIndexSource`] without caring which.

use std::fmt;
use std::rc::Rc;

use spark_signals::{Signal, signal};

/// Callback receiving every requested highlight change.
pub type HighlightChangeCallback = Rc<dyn Fn(Option<usize>)>;

/// Where a root's highlighted index lives.
#[derive(Clone)]
pub enum HighlightedIndexSource {
    /// Uncontrolled: the root owns the value. `on_change` is notified after
    /// each write.
    Owned {
        value: Signal<Option<usize>>,
        on_change: Option<HighlightChangeCallback>,
    },
    /// Controlled: reads go to the host, writes are only requests.
    External {
        get: Rc<dyn Fn() -> Option<usize>>,
        set: HighlightChangeCallback,
    },
}

impl HighlightedIndexSource {
    pub fn owned(initial: Option<usize>, on_change: Option<HighlightChangeCallback>) -> Self {
        HighlightedIndexSource::Owned {
            value: signal(initial),
            on_change,
        }
    }

    pub fn external(get: Rc<dyn Fn() -> Option<usize>>, set: Option<HighlightChangeCallback>) -> Self {
        HighlightedIndexSource::External {
            get,
            set: set.unwrap_or_else(|| -> HighlightChangeCallback { Rc::new(|_: Option<usize>| {}) }),
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, HighlightedIndexSource::External { .. })
    }

    /// Current index. Tracked when read inside an effect.
    pub fn get(&self) -> Option<usize> {
        match self {
            HighlightedIndexSource::Owned { value, .. } => value.get(),
            HighlightedIndexSource::External { get, .. } => get(),
        }
    }

    /// Request a new index. Owned sources store it and notify; external
    /// sources only forward the request.
    pub fn set(&self, index: Option<usize>) {
        match self {
            HighlightedIndexSource::Owned { value, on_change } => {
                value.set(index);
                if let Some(on_change) = on_change {
                    on_change(index);
                }
            }
            HighlightedIndexSource::External { set, .. } => set(index),
        }
    }
}

impl fmt::Debug for HighlightedIndexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_controlled() { "External" } else { "Owned" };
        f.debug_struct("HighlightedIndexSource")
            .field("mode", &mode)
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_owned_stores_and_notifies() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();
        let source = HighlightedIndexSource::owned(Some(0), Some(Rc::new(move |i: Option<usize>| calls_clone.borrow_mut().push(i))));

        assert_eq!(source.get(), Some(0));
        source.set(Some(2));
        assert_eq!(source.get(), Some(2));
        assert_eq!(*calls.borrow(), vec![Some(2)]);
    }

    #[test]
    fn test_external_only_forwards() {
        let host = signal(Some(1usize));
        let requests = Rc::new(RefCell::new(Vec::new()));

        let host_read = host.clone();
        let requests_clone = requests.clone();
        let source = HighlightedIndexSource::external(
            Rc::new(move || host_read.get()),
            Some(Rc::new(move |i: Option<usize>| requests_clone.borrow_mut().push(i))),
        );

        source.set(Some(2));
        assert_eq!(source.get(), Some(1));
        assert_eq!(*requests.borrow(), vec![Some(2)]);

        host.set(Some(2));
        assert_eq!(source.get(), Some(2));
    }
}
