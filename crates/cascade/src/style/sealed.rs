//! Builder and immutable style values.
//!
//! Use a [`StyleBuilder`] to collect entries, then freeze them into a
//! [`SealedStyle`]. A sealed style cannot change, so it never notifies; it
//! converts back into a mutable [`StatefulStyle`] with [`SealedStyle::thaw`].

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::attribute::{Attribute, StyleAttribute};
use crate::condition::{StateExpression, StateSet};
use crate::error::Result;
use crate::reactive::Subscription;
use crate::types::{AttributeValue, StyleValue};

use super::entries::StateEntries;
use super::stateful::{StatefulStyle, StyleChange};

/// Accumulates validated style entries.
///
/// ```
/// use cascade::{AttributeRegistry, AttributeSpec, StateExpression, StateSet, StyleBuilder};
///
/// let mut registry = AttributeRegistry::new();
/// let opacity = registry.register(AttributeSpec::new("paint", "opacity", 1.0_f64)).unwrap();
///
/// let mut builder = StyleBuilder::new();
/// builder
///     .set(&opacity, 0.8)
///     .unwrap()
///     .set_when(&opacity, StateExpression::state("disabled"), 0.4)
///     .unwrap();
/// let style = builder.build();
///
/// assert_eq!(style.get::<f64>(&opacity, &StateSet::new()), Some(0.8));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StyleBuilder {
    entries: BTreeMap<Attribute, StateEntries>,
}

impl StyleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: AttributeValue>(&mut self, attribute: &StyleAttribute<T>, value: T) -> Result<&mut Self> {
        self.set_value(attribute, None, value.into_value())
    }

    pub fn set_when<T: AttributeValue>(
        &mut self,
        attribute: &StyleAttribute<T>,
        expression: StateExpression,
        value: T,
    ) -> Result<&mut Self> {
        self.set_value(attribute, Some(expression), value.into_value())
    }

    pub fn set_value(
        &mut self,
        attribute: &Attribute,
        expression: Option<StateExpression>,
        value: StyleValue,
    ) -> Result<&mut Self> {
        attribute.check(&value)?;
        self.entries
            .entry(attribute.clone())
            .or_default()
            .insert(expression, value);
        Ok(self)
    }

    /// Removes the entry for `expression`, if any.
    pub fn clear(&mut self, attribute: &Attribute, expression: Option<&StateExpression>) -> &mut Self {
        if let Some(list) = self.entries.get_mut(attribute) {
            list.remove(expression);
            if list.is_empty() {
                self.entries.remove(attribute);
            }
        }
        self
    }

    pub fn build(&self) -> SealedStyle {
        SealedStyle {
            entries: Rc::new(self.entries.clone()),
        }
    }
}

/// An immutable style value. Clones share storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SealedStyle {
    entries: Rc<BTreeMap<Attribute, StateEntries>>,
}

impl SealedStyle {
    pub fn resolve(&self, attribute: &Attribute, states: &StateSet) -> Option<StyleValue> {
        self.entries
            .get(attribute)
            .and_then(|list| list.resolve(states))
            .cloned()
    }

    /// Typed [`resolve`](Self::resolve); `None` when unset or mistyped.
    pub fn get<T: AttributeValue>(&self, attribute: &StyleAttribute<T>, states: &StateSet) -> Option<T> {
        self.resolve(attribute, states)
            .and_then(|value| attribute.cast(&value).ok())
    }

    pub fn is_set(&self, attribute: &Attribute) -> bool {
        self.entries.contains_key(attribute)
    }

    pub fn attributes(&self) -> BTreeSet<Attribute> {
        self.entries.keys().cloned().collect()
    }

    pub fn get_expressions(&self, attribute: &Attribute) -> Vec<Option<StateExpression>> {
        self.entries
            .get(attribute)
            .map(|list| list.expressions().map(|e| e.cloned()).collect())
            .unwrap_or_default()
    }

    /// Never fires.
    pub fn subscribe(&self, _callback: impl Fn(&StyleChange) + 'static) -> Subscription {
        Subscription::noop()
    }

    pub fn to_builder(&self) -> StyleBuilder {
        StyleBuilder {
            entries: (*self.entries).clone(),
        }
    }

    /// A mutable copy.
    pub fn thaw(&self) -> StatefulStyle {
        StatefulStyle::from_entries((*self.entries).clone(), false)
    }

    /// A sealed [`StatefulStyle`] with these entries, for use as a dependency.
    pub fn into_style(self) -> StatefulStyle {
        let entries = Rc::try_unwrap(self.entries).unwrap_or_else(|shared| (*shared).clone());
        StatefulStyle::from_entries(entries, true)
    }
}

impl From<&StatefulStyle> for SealedStyle {
    /// Snapshot of the style's full lookup chain.
    fn from(style: &StatefulStyle) -> Self {
        SealedStyle {
            entries: Rc::new(style.flatten()),
        }
    }
}
