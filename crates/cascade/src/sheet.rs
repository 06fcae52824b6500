//! Stylesheets: unordered conditional rules per attribute with a reactive
//! best-match query.
//!
//! Rules are keyed by `(attribute, condition)`; setting a rule whose
//! condition equals an existing one replaces its value in place and keeps its
//! original position in insertion order.
//!
//! ## Choosing a winner
//!
//! Among the rules whose condition matches an element, the most specific one
//! wins. Rules of equal specificity are settled by insertion order: the
//! latest inserted wins.
//!
//! ```
//! use cascade::{AttributeRegistry, AttributeSpec, StyleCondition, StyleSheet};
//!
//! let mut registry = AttributeRegistry::new();
//! let opacity = registry.register(AttributeSpec::new("paint", "opacity", 1.0_f64)).unwrap();
//!
//! let sheet = StyleSheet::new();
//! sheet.set(&opacity, StyleCondition::new(), 0.8).unwrap();
//! assert_eq!(sheet.len(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::attribute::{Attribute, StyleAttribute};
use crate::condition::{ElementContext, StyleCondition};
use crate::error::{CascadeError, Result};
use crate::reactive::{Computed, Signal, Tracker};
use crate::types::{AttributeValue, StyleValue};

#[derive(Clone)]
struct RuleEntry {
    condition: Rc<StyleCondition>,
    value: Signal<StyleValue>,
    order: u64,
}

struct AttributeRules {
    entries: Vec<RuleEntry>,
    /// Bumped when a rule is added or removed; value edits go through the
    /// rule's own signal.
    revision: Signal<u64>,
}

impl AttributeRules {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            revision: Signal::new(0),
        }
    }
}

struct SheetInner {
    rules: RefCell<HashMap<Attribute, AttributeRules>>,
    /// Bumped when an attribute gains its first rule or loses its last one.
    attributes: Signal<u64>,
    next_order: Cell<u64>,
    sealed: Cell<bool>,
}

/// A shared collection of conditional rules.
///
/// Clones share the same rules. Queries hold no per-element state beyond the
/// [`Computed`] they return.
#[derive(Clone)]
pub struct StyleSheet {
    inner: Rc<SheetInner>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SheetInner {
                rules: RefCell::new(HashMap::new()),
                attributes: Signal::new(0),
                next_order: Cell::new(0),
                sealed: Cell::new(false),
            }),
        }
    }

    /// Sets a typed rule. See [`set_value`](Self::set_value).
    pub fn set<T: AttributeValue>(
        &self,
        attribute: &StyleAttribute<T>,
        condition: StyleCondition,
        value: T,
    ) -> Result<()> {
        self.set_value(attribute, condition, value.into_value())
    }

    /// Inserts the rule, or replaces the value of the rule with an equal
    /// condition.
    pub fn set_value(
        &self,
        attribute: &Attribute,
        condition: StyleCondition,
        value: StyleValue,
    ) -> Result<()> {
        self.check_unsealed()?;
        attribute.check(&value)?;

        let mut rules = self.inner.rules.borrow_mut();
        let slot = rules
            .entry(attribute.clone())
            .or_insert_with(AttributeRules::new);

        let existing = slot
            .entries
            .iter()
            .find(|e| *e.condition == condition)
            .map(|e| e.value.clone());
        if let Some(signal) = existing {
            drop(rules);
            log::debug!("stylesheet: replace {attribute} for {condition}");
            signal.set(value);
            return Ok(());
        }

        let first = slot.entries.is_empty();
        let order = self.inner.next_order.get();
        self.inner.next_order.set(order + 1);
        log::debug!("stylesheet: add {attribute} for {condition}");
        slot.entries.push(RuleEntry {
            condition: Rc::new(condition),
            value: Signal::new(value),
            order,
        });
        let revision = slot.revision.clone();
        drop(rules);

        revision.update(|r| *r += 1);
        if first {
            self.inner.attributes.update(|r| *r += 1);
        }
        Ok(())
    }

    /// Removes the rule with an equal condition; a no-op when there is none.
    pub fn clear(&self, attribute: &Attribute, condition: &StyleCondition) -> Result<()> {
        self.check_unsealed()?;

        let mut rules = self.inner.rules.borrow_mut();
        let Some(slot) = rules.get_mut(attribute) else {
            return Ok(());
        };
        let Some(index) = slot.entries.iter().position(|e| *e.condition == *condition) else {
            return Ok(());
        };
        slot.entries.remove(index);
        let last = slot.entries.is_empty();
        let revision = slot.revision.clone();
        drop(rules);

        log::debug!("stylesheet: clear {attribute} for {condition}");
        revision.update(|r| *r += 1);
        if last {
            self.inner.attributes.update(|r| *r += 1);
        }
        Ok(())
    }

    /// Value of the best matching rule, kept current as the element's inputs,
    /// the rule set, or the winning rule's value change. `None` when nothing
    /// matches. The element is held weakly.
    pub fn best_match(
        &self,
        attribute: &Attribute,
        element: &Rc<dyn ElementContext>,
    ) -> Computed<Option<StyleValue>> {
        let sheet = self.clone();
        let attribute = attribute.clone();
        let element = Rc::downgrade(element);
        Computed::new(move |cx| {
            let element = element.upgrade()?;
            sheet.lookup(&attribute, &*element, cx)
        })
    }

    /// Snapshot of [`best_match`](Self::best_match).
    pub fn best_match_now(
        &self,
        attribute: &Attribute,
        element: &dyn ElementContext,
    ) -> Option<StyleValue> {
        self.lookup(attribute, element, &mut Tracker::untracked())
    }

    /// Best match evaluated inside a caller's computation; every input read
    /// is recorded on `cx`.
    pub fn lookup(
        &self,
        attribute: &Attribute,
        element: &dyn ElementContext,
        cx: &mut Tracker,
    ) -> Option<StyleValue> {
        let (revision, entries) = self.snapshot(attribute);
        cx.track(&revision);

        let matching: Vec<&RuleEntry> = entries
            .iter()
            .filter(|entry| entry.condition.evaluate(element, cx))
            .collect();
        let winner = select_winner(&matching)?;
        let value = cx.track(&winner.value);
        log::trace!(
            "stylesheet: {attribute} resolved by {} among {} matching rules",
            winner.condition,
            matching.len()
        );
        Some(value)
    }

    /// Attributes for which at least one rule currently matches `element`.
    pub fn matched_attributes(
        &self,
        element: &dyn ElementContext,
        cx: &mut Tracker,
    ) -> BTreeSet<Attribute> {
        cx.track(&self.inner.attributes);
        let mut matched = BTreeSet::new();
        for attribute in self.attributes() {
            let (revision, entries) = self.snapshot(&attribute);
            cx.track(&revision);
            if entries.iter().any(|e| e.condition.evaluate(element, cx)) {
                matched.insert(attribute);
            }
        }
        matched
    }

    /// Rules for `attribute`, most specific first. Equally specific rules
    /// appear latest inserted first, the order in which
    /// [`best_match`](Self::best_match) would prefer them.
    pub fn rules(&self, attribute: &Attribute) -> Vec<(StyleCondition, StyleValue)> {
        let (_, entries) = self.snapshot(attribute);
        let mut ordered: Vec<&RuleEntry> = entries.iter().collect();
        ordered.sort_by(|a, b| {
            b.condition
                .compare_specificity(&a.condition)
                .then(b.order.cmp(&a.order))
        });
        ordered
            .into_iter()
            .map(|e| ((*e.condition).clone(), e.value.get()))
            .collect()
    }

    /// Attributes that have at least one rule.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attributes: Vec<Attribute> = self
            .inner
            .rules
            .borrow()
            .iter()
            .filter(|(_, rules)| !rules.entries.is_empty())
            .map(|(attribute, _)| attribute.clone())
            .collect();
        attributes.sort();
        attributes
    }

    /// Total number of rules across all attributes.
    pub fn len(&self) -> usize {
        self.inner
            .rules
            .borrow()
            .values()
            .map(|r| r.entries.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the rule set. Values already handed out keep tracking element
    /// inputs; only `set` and `clear` are rejected.
    pub fn seal(&self) {
        if !self.inner.sealed.replace(true) {
            log::debug!("stylesheet: sealed with {} rules", self.len());
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.get()
    }

    fn check_unsealed(&self) -> Result<()> {
        if self.is_sealed() {
            Err(CascadeError::Sealed)
        } else {
            Ok(())
        }
    }

    /// Copies out the rules so conditions are evaluated without holding the
    /// borrow.
    fn snapshot(&self, attribute: &Attribute) -> (Signal<u64>, Vec<RuleEntry>) {
        let mut rules = self.inner.rules.borrow_mut();
        let slot = rules
            .entry(attribute.clone())
            .or_insert_with(AttributeRules::new);
        (slot.revision.clone(), slot.entries.clone())
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSheet")
            .field("rules", &self.len())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

fn select_winner<'a>(matching: &[&'a RuleEntry]) -> Option<&'a RuleEntry> {
    matching.iter().copied().max_by(|a, b| {
        a.condition
            .compare_specificity(&b.condition)
            .then(a.order.cmp(&b.order))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeRegistry, AttributeSpec};
    use crate::condition::{ElementType, ElementTypes, GroupSet, StateExpression, StateSet, TemplateRole};

    struct Fixed {
        ty: ElementType,
        states: StateSet,
        groups: GroupSet,
    }

    impl ElementContext for Fixed {
        fn element_type(&self) -> ElementType {
            self.ty.clone()
        }
        fn states(&self, _: &mut Tracker) -> StateSet {
            self.states.clone()
        }
        fn groups(&self, _: &mut Tracker) -> GroupSet {
            self.groups.clone()
        }
        fn parent(&self, _: &mut Tracker) -> Option<Rc<dyn ElementContext>> {
            None
        }
        fn template_role(&self, _: &mut Tracker) -> Option<TemplateRole> {
            None
        }
    }

    fn setup() -> (StyleAttribute<f64>, ElementTypes) {
        let mut registry = AttributeRegistry::new();
        let opacity = registry
            .register(AttributeSpec::new("paint", "opacity", 1.0_f64))
            .unwrap();
        let mut types = ElementTypes::new();
        types.register("Widget", None).unwrap();
        types.register("Button", Some("Widget")).unwrap();
        (opacity, types)
    }

    #[test]
    fn test_set_replaces_equal_condition() {
        let (opacity, _) = setup();
        let sheet = StyleSheet::new();
        sheet.set(&opacity, StyleCondition::new(), 0.2).unwrap();
        sheet.set(&opacity, StyleCondition::new(), 0.3).unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.rules(&opacity)[0].1, StyleValue::Number(0.3));
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let (opacity, _) = setup();
        let sheet = StyleSheet::new();
        let err = sheet
            .set_value(&opacity, StyleCondition::new(), StyleValue::Bool(true))
            .unwrap_err();
        assert!(matches!(err, CascadeError::Type { .. }));
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_clear_missing_rule_is_noop() {
        let (opacity, _) = setup();
        let sheet = StyleSheet::new();
        assert!(sheet.clear(&opacity, &StyleCondition::new()).is_ok());
    }

    #[test]
    fn test_most_specific_rule_wins() {
        let (opacity, types) = setup();
        let sheet = StyleSheet::new();
        let widget = types.get("Widget").unwrap();
        let button = types.get("Button").unwrap();
        sheet.set(&opacity, StyleCondition::new().with_type(button.clone()), 0.7).unwrap();
        sheet.set(&opacity, StyleCondition::new().with_type(widget), 0.9).unwrap();

        let element = Fixed {
            ty: button,
            states: StateSet::new(),
            groups: GroupSet::new(),
        };
        assert_eq!(
            sheet.best_match_now(&opacity, &element),
            Some(StyleValue::Number(0.7))
        );
    }

    #[test]
    fn test_equal_specificity_latest_wins() {
        let (opacity, types) = setup();
        let sheet = StyleSheet::new();
        let button = types.get("Button").unwrap();
        sheet
            .set(&opacity, StyleCondition::new().with_group("a"), 0.1)
            .unwrap();
        sheet
            .set(&opacity, StyleCondition::new().with_group("b"), 0.2)
            .unwrap();
        // Replacing keeps the original insertion position.
        sheet
            .set(&opacity, StyleCondition::new().with_group("a"), 0.3)
            .unwrap();

        let element = Fixed {
            ty: button,
            states: StateSet::new(),
            groups: ["a", "b"].into_iter().collect(),
        };
        assert_eq!(
            sheet.best_match_now(&opacity, &element),
            Some(StyleValue::Number(0.2))
        );
    }

    #[test]
    fn test_rules_ordered_by_specificity() {
        let (opacity, _) = setup();
        let sheet = StyleSheet::new();
        sheet.set(&opacity, StyleCondition::new(), 1.0).unwrap();
        sheet
            .set(
                &opacity,
                StyleCondition::new().with_state(StateExpression::state("hover")),
                0.5,
            )
            .unwrap();
        sheet
            .set(&opacity, StyleCondition::new().with_group("dim"), 0.4)
            .unwrap();

        let values: Vec<StyleValue> = sheet.rules(&opacity).into_iter().map(|(_, v)| v).collect();
        assert_eq!(
            values,
            vec![
                StyleValue::Number(0.5),
                StyleValue::Number(0.4),
                StyleValue::Number(1.0)
            ]
        );
    }

    #[test]
    fn test_sealed_sheet_rejects_mutation() {
        let (opacity, _) = setup();
        let sheet = StyleSheet::new();
        sheet.seal();
        sheet.seal();
        assert_eq!(
            sheet.set(&opacity, StyleCondition::new(), 0.5),
            Err(CascadeError::Sealed)
        );
        assert_eq!(
            sheet.clear(&opacity, &StyleCondition::new()),
            Err(CascadeError::Sealed)
        );
    }
}
