//! Context stack - how bindings find the list or root they belong to.
//!
//! Providers push themselves for the duration of a closure; bindings created
//! inside that closure look up the nearest provider of the type they need.
//! Lookups are by concrete type, so nested composites of different metadata
//! types do not see each other.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{CompositeError, Result};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Rc<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Push a provider onto the stack.
pub fn push_context<T: 'static>(value: Rc<T>) {
    CONTEXT_STACK.with(|stack| stack.borrow_mut().push(value));
}

/// Pop the innermost provider.
pub fn pop_context() {
    CONTEXT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// Nearest provider of type `T`, if any.
pub fn use_context<T: 'static>() -> Option<Rc<T>> {
    CONTEXT_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .find_map(|value| Rc::clone(value).downcast::<T>().ok())
    })
}

/// Nearest provider of type `T`, or a [`CompositeError::MissingContext`]
/// naming the consumer and the provider it expected.
pub fn require_context<T: 'static>(consumer: &'static str, provider: &'static str) -> Result<Rc<T>> {
    use_context::<T>().ok_or(CompositeError::MissingContext { consumer, provider })
}

/// Run `f` with `value` provided. The provider is popped even if `f` panics.
pub fn provide<T: 'static, R>(value: Rc<T>, f: impl FnOnce() -> R) -> R {
    struct PopGuard;
    impl Drop for PopGuard {
        fn drop(&mut self) {
            pop_context();
        }
    }

    push_context(value);
    let _guard = PopGuard;
    f()
}

/// Empty the stack.
pub fn reset_context() {
    CONTEXT_STACK.with(|stack| stack.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_provider_wins() {
        reset_context();
        provide(Rc::new(1u32), || {
            assert_eq!(use_context::<u32>().as_deref(), Some(&1));
            provide(Rc::new(2u32), || {
                assert_eq!(use_context::<u32>().as_deref(), Some(&2));
            });
            assert_eq!(use_context::<u32>().as_deref(), Some(&1));
        });
        assert!(use_context::<u32>().is_none());
    }

    #[test]
    fn test_lookup_is_by_type() {
        reset_context();
        provide(Rc::new("outer"), || {
            provide(Rc::new(5u8), || {
                assert_eq!(use_context::<&str>().as_deref(), Some(&"outer"));
            });
        });
    }

    #[test]
    fn test_require_reports_missing_provider() {
        reset_context();
        let err = require_context::<u32>("use_thing", "ThingProvider").unwrap_err();
        assert_eq!(
            err,
            CompositeError::MissingContext {
                consumer: "use_thing",
                provider: "ThingProvider"
            }
        );
    }
}
