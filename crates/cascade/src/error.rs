//! Error types for style registration, mutation and lookup.
//!
//! Every mutator in this crate checks its preconditions before touching any
//! state, so an `Err` always means nothing was changed.

use thiserror::Error;

use crate::types::ValueKind;

/// Errors that can occur while registering, mutating or reading styles.
///
/// # Examples
///
/// ```rust
/// use cascade::{AttributeRegistry, AttributeSpec, CascadeError};
///
/// let mut registry = AttributeRegistry::new();
/// registry.register(AttributeSpec::new("layout", "opacity", 1.0_f64)).unwrap();
///
/// // Same identity twice is rejected.
/// let again = registry.register(AttributeSpec::new("layout", "opacity", 0.5_f64));
/// assert!(matches!(again, Err(CascadeError::DuplicateAttribute { .. })));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CascadeError {
    /// An attribute with the same domain and name was already registered.
    #[error("attribute {domain}.{name} is already registered")]
    DuplicateAttribute { domain: String, name: String },

    /// An element type with the same name was already registered.
    #[error("element type {0} is already registered")]
    DuplicateElementType(String),

    /// A value does not have the type the attribute was registered with.
    #[error("attribute {attribute} expects a {expected} value, got {found}")]
    Type {
        attribute: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// The attribute's validator rejected the value.
    #[error("invalid value for {attribute}: {reason}")]
    Validation { attribute: String, reason: String },

    /// The style object is sealed and cannot be mutated.
    #[error("style is sealed and cannot be modified")]
    Sealed,

    /// A dependency or anchor argument does not fit the current graph.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A state expression could not be parsed.
    #[error("invalid state expression: {0}")]
    InvalidStateExpression(String),
}

pub type Result<T> = std::result::Result<T, CascadeError>;
