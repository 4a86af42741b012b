//! Error type for structural integration mistakes.
//!
//! Navigation itself never fails: every key press on every reachable state
//! resolves to a move or a no-op. The only error is a binding used outside
//! of the provider it needs.

use thiserror::Error;

/// Errors raised while wiring bindings to their providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// A binding was created with no matching provider on the context stack.
    #[error("{consumer} must be used within <{provider}>: no {provider} is being provided")]
    MissingContext {
        consumer: &'static str,
        provider: &'static str,
    },
}

/// Result alias for binding constructors.
pub type Result<T> = std::result::Result<T, CompositeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context_message_names_both_sides() {
        let err = CompositeError::MissingContext {
            consumer: "use_composite_item",
            provider: "CompositeRoot",
        };
        let message = err.to_string();
        assert!(message.contains("use_composite_item"));
        assert!(message.contains("CompositeRoot"));
    }
}
