//! Style attribute identity, typing and registration.
//!
//! Attributes are registered once per domain at startup through an
//! [`AttributeRegistry`] and handed out as [`StyleAttribute<T>`] tokens.
//! Two attributes are equal when their domain and name are equal; values,
//! defaults and validators play no part in identity.
//!
//! ```rust
//! use cascade::{AttributeRegistry, AttributeSpec};
//!
//! let mut registry = AttributeRegistry::new();
//! let opacity = registry
//!     .register(
//!         AttributeSpec::new("paint", "opacity", 1.0_f64)
//!             .validator(|v| if (0.0..=1.0).contains(v) { Ok(()) } else { Err("out of range".into()) }),
//!     )
//!     .unwrap();
//!
//! assert_eq!(opacity.default_value(), 1.0);
//! assert!(opacity.validate(&1.5).is_err());
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use crate::error::{CascadeError, Result};
use crate::types::{AttributeValue, StyleValue, ValueKind};

type Validator = Rc<dyn Fn(&StyleValue) -> std::result::Result<(), String>>;

struct AttributeInfo {
    domain: String,
    name: String,
    kind: ValueKind,
    default: StyleValue,
    validator: Option<Validator>,
    inherited: bool,
}

/// Untyped attribute identity, shared by every [`StyleAttribute`] handle.
#[derive(Clone)]
pub struct Attribute(Rc<AttributeInfo>);

impl Attribute {
    pub fn domain(&self) -> &str {
        &self.0.domain
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> ValueKind {
        self.0.kind
    }

    pub fn default_value(&self) -> &StyleValue {
        &self.0.default
    }

    /// Whether unset values fall through to the parent element.
    pub fn is_inherited(&self) -> bool {
        self.0.inherited
    }

    /// Checks that `value` has this attribute's type and passes its validator.
    pub fn check(&self, value: &StyleValue) -> Result<()> {
        let found = value.kind();
        let widened = self.0.kind == ValueKind::Number && found == ValueKind::Integer;
        if found != self.0.kind && !widened {
            return Err(CascadeError::Type {
                attribute: self.to_string(),
                expected: self.0.kind,
                found,
            });
        }
        if let Some(validator) = &self.0.validator {
            validator(value).map_err(|reason| CascadeError::Validation {
                attribute: self.to_string(),
                reason,
            })?;
        }
        Ok(())
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
            || (self.0.domain == other.0.domain && self.0.name == other.0.name)
    }
}

impl Eq for Attribute {}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.domain.hash(state);
        self.0.name.hash(state);
    }
}

impl PartialOrd for Attribute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Attribute {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.domain(), self.name()).cmp(&(other.domain(), other.name()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.domain, self.0.name)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("id", &format_args!("{self}"))
            .field("kind", &self.0.kind)
            .field("inherited", &self.0.inherited)
            .finish()
    }
}

/// A typed attribute token.
///
/// Derefs to the untyped [`Attribute`], so it can be passed wherever an
/// attribute identity is expected.
pub struct StyleAttribute<T> {
    attribute: Attribute,
    default: T,
}

impl<T: AttributeValue> StyleAttribute<T> {
    /// Recovers a typed handle from an untyped one.
    pub fn from_attribute(attribute: Attribute) -> Result<Self> {
        let default = match T::from_value(attribute.default_value()) {
            Some(default) if attribute.kind() == T::KIND => default,
            _ => {
                return Err(CascadeError::Type {
                    attribute: attribute.to_string(),
                    expected: attribute.kind(),
                    found: T::KIND,
                });
            }
        };
        Ok(Self { attribute, default })
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn default_value(&self) -> T {
        self.default.clone()
    }

    pub fn cast(&self, value: &StyleValue) -> Result<T> {
        T::from_value(value).ok_or_else(|| CascadeError::Type {
            attribute: self.attribute.to_string(),
            expected: self.attribute.kind(),
            found: value.kind(),
        })
    }

    pub fn validate(&self, value: &T) -> Result<()> {
        self.attribute.check(&value.clone().into_value())
    }

    /// Erases `value` after validating it.
    pub fn value(&self, value: T) -> Result<StyleValue> {
        let value = value.into_value();
        self.attribute.check(&value)?;
        Ok(value)
    }
}

impl<T> Deref for StyleAttribute<T> {
    type Target = Attribute;

    fn deref(&self) -> &Attribute {
        &self.attribute
    }
}

impl<T: Clone> Clone for StyleAttribute<T> {
    fn clone(&self) -> Self {
        Self {
            attribute: self.attribute.clone(),
            default: self.default.clone(),
        }
    }
}

impl<T> PartialEq for StyleAttribute<T> {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute
    }
}

impl<T> Eq for StyleAttribute<T> {}

impl<T> fmt::Debug for StyleAttribute<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.attribute, f)
    }
}

/// Registration parameters for one attribute.
pub struct AttributeSpec<T> {
    domain: String,
    name: String,
    default: T,
    validator: Option<Box<dyn Fn(&T) -> std::result::Result<(), String>>>,
    inherited: bool,
}

impl<T: AttributeValue> AttributeSpec<T> {
    pub fn new(domain: impl Into<String>, name: impl Into<String>, default: T) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            default,
            validator: None,
            inherited: false,
        }
    }

    pub fn inherited(mut self, inherited: bool) -> Self {
        self.inherited = inherited;
        self
    }

    pub fn validator(
        mut self,
        validator: impl Fn(&T) -> std::result::Result<(), String> + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }
}

/// All attributes known to a style context, keyed by `(domain, name)`.
#[derive(Default)]
pub struct AttributeRegistry {
    by_id: HashMap<(String, String), Attribute>,
    order: Vec<Attribute>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: AttributeValue>(&mut self, spec: AttributeSpec<T>) -> Result<StyleAttribute<T>> {
        let key = (spec.domain.clone(), spec.name.clone());
        if self.by_id.contains_key(&key) {
            return Err(CascadeError::DuplicateAttribute {
                domain: spec.domain,
                name: spec.name,
            });
        }

        let validator: Option<Validator> = spec.validator.map(|check| {
            let erased: Validator = Rc::new(move |value: &StyleValue| match T::from_value(value) {
                Some(typed) => check(&typed),
                // Type mismatches are reported by `Attribute::check` before this runs.
                None => Ok(()),
            });
            erased
        });

        let attribute = Attribute(Rc::new(AttributeInfo {
            domain: spec.domain,
            name: spec.name,
            kind: T::KIND,
            default: spec.default.into_value(),
            validator,
            inherited: spec.inherited,
        }));
        attribute.check(attribute.default_value())?;

        log::debug!(
            "registered attribute {} ({}, inherited={})",
            attribute,
            attribute.kind(),
            attribute.is_inherited()
        );
        self.by_id.insert(key, attribute.clone());
        self.order.push(attribute.clone());
        StyleAttribute::from_attribute(attribute)
    }

    pub fn lookup(&self, domain: &str, name: &str) -> Option<Attribute> {
        self.by_id.get(&(domain.to_string(), name.to_string())).cloned()
    }

    /// Attributes of `domain`, in registration order.
    pub fn domain<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.order.iter().filter(move |a| a.domain() == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}
