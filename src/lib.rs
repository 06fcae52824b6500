//! # stylecast
//!
//! Reactive style cascade for element trees.
//!
//! - [`cascade`]: attributes, values, state expressions, conditions,
//!   stylesheets and stateful styles
//! - [`elements`]: documents, elements and their live style views
//!
//! The most used items of both crates are re-exported at the root.

pub use cascade;
pub use elements;

pub use cascade::{
    Attribute, AttributeSpec, CascadeError, StateExpression, StatefulStyle, StyleAttribute,
    StyleCondition, StyleContext, StyleSheet, StyleValue,
};
pub use elements::{Document, Element, ElementError, ElementStyleView, PseudoStates};
