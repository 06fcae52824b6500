//! Rule conditions: state expressions, element types, role paths, and the
//! specificity order between conditions.

pub mod context;
pub mod element_type;
pub mod matcher;
pub mod parse;
pub mod state;

pub use context::{ElementContext, TemplateRole, is_ancestor, same_element};
pub use element_type::{ElementType, ElementTypes};
pub use matcher::{Role, StyleCondition};
pub use parse::{parse_state_expression, parse_state_name};
pub use state::{GroupSet, MAX_EXACT_STATES, Name, NameSet, StateExpression, StateSet, Truth};
