//! Mutable style objects with local state rules and a dependency chain.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::attribute::{Attribute, StyleAttribute};
use crate::condition::{StateExpression, StateSet};
use crate::error::{CascadeError, Result};
use crate::reactive::{EventStream, Signal, Subscription};
use crate::types::{AttributeValue, StyleValue};

use super::entries::{Insert, StateEntries, StateEntry, shadows};

/// A change to the visible rules of one attribute.
///
/// `expressions` lists the state expressions whose values may now differ;
/// `None` stands for the unconditional entry.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleChange {
    pub attribute: Attribute,
    pub expressions: Vec<Option<StateExpression>>,
}

struct Dependency {
    style: StatefulStyle,
    _forward: Subscription,
}

struct StyleInner {
    entries: RefCell<BTreeMap<Attribute, StateEntries>>,
    dependencies: RefCell<Vec<Dependency>>,
    changes: EventStream<StyleChange>,
    revisions: RefCell<HashMap<Attribute, Signal<u64>>>,
    version: Signal<u64>,
    sealed: Cell<bool>,
}

/// Visible expressions per attribute.
type Visible = BTreeMap<Attribute, Vec<Option<StateExpression>>>;

/// Local state rules per attribute, backed by an ordered chain of dependency
/// styles.
///
/// Lookups consult local entries first (most specific first, the
/// unconditional entry last) and then each dependency in order. A change is
/// only announced when it is visible: an entry is hidden when something
/// consulted before it is unconditional, or holds whenever the entry does.
///
/// ```
/// use cascade::{AttributeRegistry, AttributeSpec, StateExpression, StatefulStyle, StateSet, StyleValue};
///
/// let mut registry = AttributeRegistry::new();
/// let opacity = registry.register(AttributeSpec::new("paint", "opacity", 1.0_f64)).unwrap();
///
/// let base = StatefulStyle::new();
/// base.set(&opacity, 0.9).unwrap();
///
/// let style = StatefulStyle::new();
/// style.set_when(&opacity, StateExpression::state("hover"), 0.5).unwrap();
/// style.add_dependency(&base, None).unwrap();
///
/// let hovered: StateSet = ["hover"].into_iter().collect();
/// assert_eq!(style.resolve(&opacity, &hovered), Some(StyleValue::Number(0.5)));
/// assert_eq!(style.resolve(&opacity, &StateSet::new()), Some(StyleValue::Number(0.9)));
/// ```
#[derive(Clone)]
pub struct StatefulStyle {
    inner: Rc<StyleInner>,
}

impl StatefulStyle {
    pub fn new() -> Self {
        Self::from_entries(BTreeMap::new(), false)
    }

    pub(crate) fn from_entries(entries: BTreeMap<Attribute, StateEntries>, sealed: bool) -> Self {
        Self {
            inner: Rc::new(StyleInner {
                entries: RefCell::new(entries),
                dependencies: RefCell::new(Vec::new()),
                changes: EventStream::new(),
                revisions: RefCell::new(HashMap::new()),
                version: Signal::new(0),
                sealed: Cell::new(sealed),
            }),
        }
    }

    /// Sets the unconditional value of `attribute`.
    pub fn set<T: AttributeValue>(&self, attribute: &StyleAttribute<T>, value: T) -> Result<()> {
        self.set_value(attribute, None, value.into_value())
    }

    /// Sets the value used while `expression` holds.
    pub fn set_when<T: AttributeValue>(
        &self,
        attribute: &StyleAttribute<T>,
        expression: StateExpression,
        value: T,
    ) -> Result<()> {
        self.set_value(attribute, Some(expression), value.into_value())
    }

    pub fn set_value(
        &self,
        attribute: &Attribute,
        expression: Option<StateExpression>,
        value: StyleValue,
    ) -> Result<()> {
        self.check_unsealed()?;
        attribute.check(&value)?;

        let visible = {
            let mut entries = self.inner.entries.borrow_mut();
            let list = entries.entry(attribute.clone()).or_default();
            match list.insert(expression.clone(), value) {
                Insert::Unchanged => false,
                Insert::Replaced(index) | Insert::Inserted(index) => {
                    !list.shadowed_before(index, expression.as_ref())
                }
            }
        };
        if visible {
            self.notify(attribute, vec![expression]);
        }
        Ok(())
    }

    /// Removes the local entry for `expression`. Returns whether one existed.
    pub fn clear(&self, attribute: &Attribute, expression: Option<&StateExpression>) -> Result<bool> {
        self.check_unsealed()?;

        let removed = {
            let mut entries = self.inner.entries.borrow_mut();
            let Some(list) = entries.get_mut(attribute) else {
                return Ok(false);
            };
            let removed = list
                .remove(expression)
                .map(|(index, entry)| !list.shadowed_before(index, entry.expression.as_ref()));
            if list.is_empty() {
                entries.remove(attribute);
            }
            removed
        };
        match removed {
            None => Ok(false),
            Some(visible) => {
                if visible {
                    self.notify(attribute, vec![expression.cloned()]);
                }
                Ok(true)
            }
        }
    }

    /// Removes every local entry of `attribute`.
    pub fn clear_attribute(&self, attribute: &Attribute) -> Result<()> {
        self.check_unsealed()?;

        let Some(list) = self.inner.entries.borrow_mut().remove(attribute) else {
            return Ok(());
        };
        let visible: Vec<Option<StateExpression>> = list
            .iter()
            .enumerate()
            .filter(|(index, e)| !list.shadowed_before(*index, e.expression.as_ref()))
            .map(|(_, e)| e.expression.clone())
            .collect();
        self.notify(attribute, visible);
        Ok(())
    }

    /// Local expressions of `attribute`, in lookup order.
    pub fn get_local_expressions(&self, attribute: &Attribute) -> Vec<Option<StateExpression>> {
        self.inner
            .entries
            .borrow()
            .get(attribute)
            .map(|list| list.expressions().map(|e| e.cloned()).collect())
            .unwrap_or_default()
    }

    /// Local expressions followed by those of every dependency, in lookup
    /// order.
    pub fn get_expressions(&self, attribute: &Attribute) -> Vec<Option<StateExpression>> {
        self.chain_entries(attribute)
            .into_iter()
            .map(|e| e.expression)
            .collect()
    }

    /// Value of the first entry in lookup order whose expression holds.
    pub fn resolve(&self, attribute: &Attribute, states: &StateSet) -> Option<StyleValue> {
        let local = self
            .inner
            .entries
            .borrow()
            .get(attribute)
            .and_then(|list| list.resolve(states))
            .cloned();
        if local.is_some() {
            return local;
        }
        self.dependencies()
            .iter()
            .find_map(|dep| dep.resolve(attribute, states))
    }

    /// True when this style or any dependency has an entry for `attribute`.
    pub fn is_set(&self, attribute: &Attribute) -> bool {
        self.inner.entries.borrow().contains_key(attribute)
            || self.dependencies().iter().any(|dep| dep.is_set(attribute))
    }

    /// Attributes with an entry here or in any dependency.
    pub fn attributes(&self) -> BTreeSet<Attribute> {
        let mut attributes: BTreeSet<Attribute> =
            self.inner.entries.borrow().keys().cloned().collect();
        for dep in self.dependencies() {
            attributes.extend(dep.attributes());
        }
        attributes
    }

    pub fn dependencies(&self) -> Vec<StatefulStyle> {
        self.inner
            .dependencies
            .borrow()
            .iter()
            .map(|d| d.style.clone())
            .collect()
    }

    /// Inserts `style` into the dependency chain right after `after`, or at
    /// the end when `after` is `None`.
    pub fn add_dependency(&self, style: &StatefulStyle, after: Option<&StatefulStyle>) -> Result<()> {
        self.check_unsealed()?;
        self.check_insertable(style, None)?;
        let position = match after {
            None => self.inner.dependencies.borrow().len(),
            Some(anchor) => self.dependency_index(anchor).map(|i| i + 1).ok_or_else(|| {
                CascadeError::InvalidArgument("anchor is not a dependency of this style".into())
            })?,
        };

        let dependency = self.attach(style);
        self.inner
            .dependencies
            .borrow_mut()
            .insert(position, dependency);
        log::debug!("style: dependency added at position {position}");

        let visible = self.visible_at(position, style);
        self.notify_all(visible);
        Ok(())
    }

    /// Detaches `style` from the chain.
    pub fn remove_dependency(&self, style: &StatefulStyle) -> Result<()> {
        self.check_unsealed()?;
        let position = self.dependency_index(style).ok_or_else(|| {
            CascadeError::InvalidArgument("style is not a dependency of this style".into())
        })?;

        let visible = self.visible_at(position, style);
        let removed = self.inner.dependencies.borrow_mut().remove(position);
        drop(removed);
        log::debug!("style: dependency removed from position {position}");

        self.notify_all(visible);
        Ok(())
    }

    /// Swaps `old` for `new` at the same position in the chain.
    pub fn replace_dependency(&self, old: &StatefulStyle, new: &StatefulStyle) -> Result<()> {
        self.check_unsealed()?;
        let position = self.dependency_index(old).ok_or_else(|| {
            CascadeError::InvalidArgument("style is not a dependency of this style".into())
        })?;
        if old.ptr_eq(new) {
            return Ok(());
        }
        self.check_insertable(new, Some(old))?;

        let mut visible = self.visible_at(position, old);
        let dependency = self.attach(new);
        let replaced = std::mem::replace(
            &mut self.inner.dependencies.borrow_mut()[position],
            dependency,
        );
        drop(replaced);
        log::debug!("style: dependency replaced at position {position}");

        for (attribute, expressions) in self.visible_at(position, new) {
            let merged = visible.entry(attribute).or_default();
            for expression in expressions {
                if !merged.contains(&expression) {
                    merged.push(expression);
                }
            }
        }
        self.notify_all(visible);
        Ok(())
    }

    /// Listens for visible changes. A sealed style never changes, so the
    /// returned handle is a no-op.
    pub fn subscribe(&self, callback: impl Fn(&StyleChange) + 'static) -> Subscription {
        if self.is_sealed() {
            return Subscription::noop();
        }
        self.inner.changes.subscribe(callback)
    }

    /// Counter bumped once per visible change of `attribute`.
    pub fn revision(&self, attribute: &Attribute) -> Signal<u64> {
        self.inner
            .revisions
            .borrow_mut()
            .entry(attribute.clone())
            .or_insert_with(|| Signal::new(0))
            .clone()
    }

    /// Counter bumped once per visible change of any attribute.
    pub fn version(&self) -> Signal<u64> {
        self.inner.version.clone()
    }

    /// Freezes the style: the dependency chain is flattened into local
    /// entries and detached, and every mutator fails with
    /// [`CascadeError::Sealed`] from now on.
    pub fn seal(&self) {
        if self.is_sealed() {
            return;
        }
        let flattened = self.flatten();
        let detached = std::mem::take(&mut *self.inner.dependencies.borrow_mut());
        *self.inner.entries.borrow_mut() = flattened;
        self.inner.sealed.set(true);
        log::debug!(
            "style: sealed, {} dependencies flattened",
            detached.len()
        );
        drop(detached);
    }

    pub fn is_sealed(&self) -> bool {
        self.inner.sealed.get()
    }

    /// An unsealed copy with the same local entries and the same
    /// dependencies, re-attached.
    pub fn duplicate(&self) -> StatefulStyle {
        let copy = Self::from_entries(self.inner.entries.borrow().clone(), false);
        let dependencies: Vec<Dependency> = self
            .dependencies()
            .iter()
            .map(|dep| copy.attach(dep))
            .collect();
        *copy.inner.dependencies.borrow_mut() = dependencies;
        copy
    }

    pub fn ptr_eq(&self, other: &StatefulStyle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Every entry in lookup order, structurally equal expressions kept once
    /// and nothing after the first unconditional entry.
    pub(crate) fn flatten(&self) -> BTreeMap<Attribute, StateEntries> {
        let mut flattened = BTreeMap::new();
        for attribute in self.attributes() {
            let mut list = StateEntries::default();
            for entry in self.chain_entries(&attribute) {
                let last = entry.expression.is_none();
                list.push_unique(entry);
                if last {
                    break;
                }
            }
            flattened.insert(attribute, list);
        }
        flattened
    }

    fn chain_entries(&self, attribute: &Attribute) -> Vec<StateEntry> {
        let mut out: Vec<StateEntry> = self
            .inner
            .entries
            .borrow()
            .get(attribute)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default();
        for dep in self.dependencies() {
            out.extend(dep.chain_entries(attribute));
        }
        out
    }

    fn check_unsealed(&self) -> Result<()> {
        if self.is_sealed() {
            Err(CascadeError::Sealed)
        } else {
            Ok(())
        }
    }

    /// `style` may join the chain (in place of `replacing`, if given).
    fn check_insertable(&self, style: &StatefulStyle, replacing: Option<&StatefulStyle>) -> Result<()> {
        if style.ptr_eq(self) {
            return Err(CascadeError::InvalidArgument(
                "a style cannot depend on itself".into(),
            ));
        }
        let present = self.dependency_index(style).is_some();
        if present && !replacing.is_some_and(|r| r.ptr_eq(style)) {
            return Err(CascadeError::InvalidArgument(
                "style is already a dependency".into(),
            ));
        }
        if style.depends_on(self) {
            return Err(CascadeError::InvalidArgument(
                "dependency would create a cycle".into(),
            ));
        }
        Ok(())
    }

    fn depends_on(&self, other: &StatefulStyle) -> bool {
        self.dependencies()
            .iter()
            .any(|dep| dep.ptr_eq(other) || dep.depends_on(other))
    }

    fn dependency_index(&self, style: &StatefulStyle) -> Option<usize> {
        self.inner
            .dependencies
            .borrow()
            .iter()
            .position(|d| d.style.ptr_eq(style))
    }

    /// Subscribes a forwarder that re-announces `style`'s changes when they
    /// are visible through this style.
    fn attach(&self, style: &StatefulStyle) -> Dependency {
        let this: Weak<StyleInner> = Rc::downgrade(&self.inner);
        let source: Weak<StyleInner> = Rc::downgrade(&style.inner);
        let forward = style.subscribe(move |change| {
            let (Some(this), Some(source)) = (this.upgrade(), source.upgrade()) else {
                return;
            };
            let this = StatefulStyle { inner: this };
            let source = StatefulStyle { inner: source };
            let Some(position) = this.dependency_index(&source) else {
                return;
            };
            let visible: Vec<Option<StateExpression>> = change
                .expressions
                .iter()
                .filter(|e| !this.overridden(&change.attribute, e.as_ref(), position))
                .cloned()
                .collect();
            this.notify(&change.attribute, visible);
        });
        Dependency {
            style: style.clone(),
            _forward: forward,
        }
    }

    /// True when a local entry or a dependency before `position` shadows
    /// `candidate`.
    fn overridden(&self, attribute: &Attribute, candidate: Option<&StateExpression>, position: usize) -> bool {
        let local = self
            .inner
            .entries
            .borrow()
            .get(attribute)
            .is_some_and(|list| list.expressions().any(|e| shadows(e, candidate)));
        if local {
            return true;
        }
        let earlier: Vec<StatefulStyle> = self
            .dependencies()
            .into_iter()
            .take(position)
            .collect();
        earlier.iter().any(|dep| {
            dep.get_expressions(attribute)
                .iter()
                .any(|e| shadows(e.as_ref(), candidate))
        })
    }

    /// Expressions of `style` that are visible when it sits at `position`.
    fn visible_at(&self, position: usize, style: &StatefulStyle) -> Visible {
        let mut visible = Visible::new();
        for attribute in style.attributes() {
            let expressions = style.get_expressions(&attribute);
            let mut shown: Vec<Option<StateExpression>> = Vec::new();
            for (index, expression) in expressions.iter().enumerate() {
                let hidden_within = expressions[..index]
                    .iter()
                    .any(|e| shadows(e.as_ref(), expression.as_ref()));
                if !hidden_within
                    && !self.overridden(&attribute, expression.as_ref(), position)
                    && !shown.contains(expression)
                {
                    shown.push(expression.clone());
                }
            }
            if !shown.is_empty() {
                visible.insert(attribute, shown);
            }
        }
        visible
    }

    fn notify_all(&self, visible: Visible) {
        for (attribute, expressions) in visible {
            self.notify(&attribute, expressions);
        }
    }

    fn notify(&self, attribute: &Attribute, expressions: Vec<Option<StateExpression>>) {
        if expressions.is_empty() {
            return;
        }
        log::trace!(
            "style: {attribute} changed for {} expressions",
            expressions.len()
        );
        self.revision(attribute).update(|r| *r += 1);
        self.inner.version.update(|v| *v += 1);
        self.inner.changes.emit(&StyleChange {
            attribute: attribute.clone(),
            expressions,
        });
    }
}

impl Default for StatefulStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatefulStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatefulStyle")
            .field("attributes", &self.inner.entries.borrow().len())
            .field("dependencies", &self.inner.dependencies.borrow().len())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}
