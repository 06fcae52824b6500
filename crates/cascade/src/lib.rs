//! # Cascade - Reactive Style Resolution
//!
//! Decides, for any element and any style attribute, which of many competing
//! rules wins, and keeps that decision live as the element changes.
//!
//! Values come from four sources, consulted in order:
//!
//! 1. The element's local [`StatefulStyle`] and its dependency chain
//! 2. The best matching [`StyleSheet`] rule
//! 3. The parent element's resolved value, for inherited attributes
//! 4. The attribute's default
//!
//! This crate provides the attribute registry, rule conditions, stylesheets
//! and style objects. The `elements` crate puts them together into an
//! element tree with a per-element style view.
//!
//! ## Quick Start
//!
//! ```rust
//! use cascade::{AttributeSpec, StateExpression, StyleCondition, StyleContext, StyleSheet};
//!
//! let mut cx = StyleContext::new();
//! let opacity = cx.register_attribute(AttributeSpec::new("paint", "opacity", 1.0_f64)).unwrap();
//! let button = cx.register_type("Button", None).unwrap();
//!
//! let sheet = StyleSheet::new();
//! let hovered = StyleCondition::new()
//!     .with_type(button)
//!     .with_state(StateExpression::parse("hover & !disabled").unwrap());
//! sheet.set(&opacity, hovered, 0.5).unwrap();
//! ```
//!
//! ## Specificity
//!
//! Rule conditions are ordered by, in turn:
//!
//! - State expression: having one beats having none; between two, the one
//!   that holds in fewer state combinations is more specific, so an
//!   expression that strictly implies the other always wins
//! - Role path length
//! - Number of groups
//! - Depth of the required element type
//!
//! Among equally specific matches, the latest inserted rule wins.
//!
//! ## Modules
//!
//! - [`reactive`]: signals, derived values and subscriptions
//! - [`attribute`]: attribute identity, typing and registration
//! - [`condition`]: state expressions, element types and rule conditions
//! - [`sheet`]: stylesheets and best-match queries
//! - [`style`]: stateful style chains and sealed styles
//! - [`types`]: value types (colors, scalars, spacing)
//! - [`error`]: error types

pub mod attribute;
pub mod condition;
pub mod context;
pub mod error;
pub mod reactive;
pub mod sheet;
pub mod style;
pub mod types;

pub use attribute::{Attribute, AttributeRegistry, AttributeSpec, StyleAttribute};
pub use condition::{
    ElementContext, ElementType, ElementTypes, GroupSet, Name, NameSet, Role, StateExpression,
    StateSet, StyleCondition, TemplateRole, Truth,
};
pub use context::StyleContext;
pub use error::{CascadeError, Result};
pub use sheet::StyleSheet;
pub use style::{SealedStyle, StatefulStyle, StyleBuilder, StyleChange};
pub use types::{AttributeValue, Color, Keyword, Scalar, Spacing, StyleValue, Unit, ValueKind};
