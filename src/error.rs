// ============================================================================
// spark-props - Errors
// The single error type shared by the value model, primitives and tracker
// ============================================================================

use thiserror::Error;

/// Errors reported by spark-props.
///
/// Most tracker operations are deliberately forgiving (untracking an unknown
/// object, writing a getter-only property, skipping fixed properties), so the
/// variants here cover only genuine misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A tracker operation was handed something other than an object.
    #[error("expected an object to track, found {found}")]
    InvalidArgument { found: &'static str },

    /// A computed property specification is malformed.
    #[error("invalid computed property `{property}`: {reason}")]
    Configuration {
        property: String,
        reason: &'static str,
    },

    /// Redefining or deleting a property that was marked non-configurable.
    #[error("property `{0}` is not configurable")]
    NonConfigurable(String),

    /// Writing to a computed value that has no write function.
    #[error("cannot write to a computed value without a write function")]
    ReadOnlyComputed,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
