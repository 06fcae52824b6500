pub mod color;
pub mod geometry;
pub mod value;

pub use color::Color;
pub use geometry::{Scalar, Spacing, Unit};
pub use value::{AttributeValue, Keyword, StyleValue, ValueKind};
