use std::fmt;

use super::{Color, Scalar, Spacing};

/// Type descriptor of an attribute's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Integer,
    Number,
    Text,
    Keyword,
    Color,
    Scalar,
    Spacing,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Keyword => "keyword",
            ValueKind::Color => "color",
            ValueKind::Scalar => "scalar",
            ValueKind::Spacing => "spacing",
        };
        f.write_str(name)
    }
}

/// A style value with its type erased.
///
/// Stylesheets and style objects hold values of many attributes side by
/// side, so storage is untyped; [`StyleAttribute::cast`](crate::StyleAttribute::cast)
/// recovers the attribute's Rust type.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Keyword(Keyword),
    Color(Color),
    Scalar(Scalar),
    Spacing(Spacing),
}

impl StyleValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StyleValue::Bool(_) => ValueKind::Bool,
            StyleValue::Integer(_) => ValueKind::Integer,
            StyleValue::Number(_) => ValueKind::Number,
            StyleValue::Text(_) => ValueKind::Text,
            StyleValue::Keyword(_) => ValueKind::Keyword,
            StyleValue::Color(_) => ValueKind::Color,
            StyleValue::Scalar(_) => ValueKind::Scalar,
            StyleValue::Spacing(_) => ValueKind::Spacing,
        }
    }
}

/// An enumerated identifier value such as `center` or `bold`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Keyword(pub String);

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rust types that can be stored as a [`StyleValue`].
pub trait AttributeValue: Clone + PartialEq + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> StyleValue;

    /// Converts back from an erased value, `None` on a type mismatch.
    fn from_value(value: &StyleValue) -> Option<Self>;
}

macro_rules! attribute_value {
    ($ty:ty, $kind:ident) => {
        impl AttributeValue for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn into_value(self) -> StyleValue {
                StyleValue::$kind(self)
            }

            fn from_value(value: &StyleValue) -> Option<Self> {
                match value {
                    StyleValue::$kind(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for StyleValue {
            fn from(value: $ty) -> Self {
                StyleValue::$kind(value)
            }
        }
    };
}

attribute_value!(bool, Bool);
attribute_value!(i64, Integer);
attribute_value!(String, Text);
attribute_value!(Keyword, Keyword);
attribute_value!(Color, Color);
attribute_value!(Scalar, Scalar);
attribute_value!(Spacing, Spacing);

impl AttributeValue for f64 {
    const KIND: ValueKind = ValueKind::Number;

    fn into_value(self) -> StyleValue {
        StyleValue::Number(self)
    }

    // Integers widen to numbers.
    fn from_value(value: &StyleValue) -> Option<Self> {
        match value {
            StyleValue::Number(v) => Some(*v),
            StyleValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    #[test]
    fn test_integer_widens_to_number() {
        assert_eq!(f64::from_value(&StyleValue::Integer(3)), Some(3.0));
        assert_eq!(i64::from_value(&StyleValue::Number(3.0)), None);
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(StyleValue::from(Color::white()).kind(), ValueKind::Color);
        assert_eq!(StyleValue::from(Keyword::new("bold")).kind(), ValueKind::Keyword);
        assert_eq!(StyleValue::from(true).kind(), <bool as AttributeValue>::KIND);
    }

    #[test]
    fn test_structured_values_keep_their_kind() {
        let padding = Spacing::symmetric(Scalar::cells(1.0), Scalar::percent(10.0));
        let value = StyleValue::from(padding);
        assert_eq!(value.kind(), ValueKind::Spacing);
        assert_eq!(Spacing::from_value(&value), Some(padding));
        assert_eq!(Scalar::from_value(&value), None);

        assert!(Spacing::uniform(Scalar::ZERO).is_zero());
        assert!(!padding.is_zero());
        assert_eq!(padding.edges()[1].unit, Unit::Percent);
    }
}
