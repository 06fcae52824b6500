//! Per-element style resolution.
//!
//! For each attribute, an element's value comes from the first source that
//! has one:
//!
//! 1. the element's local [`StatefulStyle`](cascade::StatefulStyle), matched
//!    against its current states
//! 2. the best matching stylesheet rule
//! 3. the parent's resolved value, when the attribute is inherited
//! 4. the attribute default, when requested
//!
//! Every step reads its inputs through the tracker, so the returned values
//! follow state, group, role, ancestry, rule and parent changes without being
//! queried again.

use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::{Rc, Weak};

use cascade::reactive::{Computed, Tracker};
use cascade::{Attribute, AttributeValue, StyleAttribute, StyleValue};

use crate::element::ElementNode;

struct ViewInner {
    element: Weak<ElementNode>,
    values: RefCell<HashMap<(Attribute, bool), Computed<Option<StyleValue>>>>,
    attributes: OnceCell<Computed<BTreeSet<Attribute>>>,
}

/// Reactive view of an element's resolved style.
///
/// Values are created on first request and cached for the element's
/// lifetime; asking twice returns the same [`Computed`].
#[derive(Clone)]
pub struct ElementStyleView {
    inner: Rc<ViewInner>,
}

impl ElementStyleView {
    pub(crate) fn new(element: Weak<ElementNode>) -> Self {
        Self {
            inner: Rc::new(ViewInner {
                element,
                values: RefCell::new(HashMap::new()),
                attributes: OnceCell::new(),
            }),
        }
    }

    /// Resolved value of `attribute`. Without `with_default`, `None` means no
    /// source sets the attribute.
    pub fn get(&self, attribute: &Attribute, with_default: bool) -> Computed<Option<StyleValue>> {
        let key = (attribute.clone(), with_default);
        if let Some(value) = self.inner.values.borrow().get(&key) {
            return value.clone();
        }

        let element = self.inner.element.clone();
        let target = attribute.clone();
        let value = Computed::new(move |cx| {
            let node = element.upgrade()?;
            resolve(&node, &target, with_default, cx)
        });
        self.inner.values.borrow_mut().insert(key, value.clone());
        value
    }

    /// Typed value, always valid: a value that does not cast to `T` is
    /// logged and replaced by the default.
    pub fn value<T: AttributeValue>(&self, attribute: &StyleAttribute<T>) -> Computed<T> {
        let typed = attribute.clone();
        self.get(attribute, true).map(move |value| match value {
            Some(value) => typed.cast(value).unwrap_or_else(|err| {
                log::warn!("style view: {err}; using the default");
                typed.default_value()
            }),
            None => typed.default_value(),
        })
    }

    /// Whether a local rule, a stylesheet rule or (for inherited attributes)
    /// an ancestor sets `attribute` right now.
    pub fn is_set(&self, attribute: &Attribute) -> bool {
        let Some(node) = self.inner.element.upgrade() else {
            return false;
        };
        let mut cx = Tracker::untracked();
        resolve(&node, attribute, false, &mut cx).is_some()
    }

    /// Attributes visible on the element: local, stylesheet-matched, and
    /// inherited from the parent.
    pub fn attributes(&self) -> Computed<BTreeSet<Attribute>> {
        self.inner
            .attributes
            .get_or_init(|| {
                let element = self.inner.element.clone();
                Computed::new(move |cx| {
                    let Some(node) = element.upgrade() else {
                        return BTreeSet::new();
                    };
                    visible_attributes(&node, cx)
                })
            })
            .clone()
    }
}

fn resolve(
    node: &ElementNode,
    attribute: &Attribute,
    with_default: bool,
    cx: &mut Tracker,
) -> Option<StyleValue> {
    let style = node.style();
    cx.track(&style.revision(attribute));
    if style.is_set(attribute) {
        let states = cx.track(node.states_signal());
        if let Some(value) = style.resolve(attribute, &states) {
            log::trace!("style view: {attribute} from local style");
            return Some(value);
        }
    }

    if let Some(value) = node.sheet().lookup(attribute, node, cx) {
        return Some(value);
    }

    if attribute.is_inherited() {
        if let Some(parent) = node.parent_node(cx) {
            let inherited = parent.view().get(attribute, false);
            if let Some(value) = cx.track_computed(&inherited) {
                log::trace!("style view: {attribute} inherited from parent");
                return Some(value);
            }
        }
    }

    with_default.then(|| attribute.default_value().clone())
}

fn visible_attributes(node: &ElementNode, cx: &mut Tracker) -> BTreeSet<Attribute> {
    cx.track(&node.style().version());
    let mut attributes = node.style().attributes();
    attributes.extend(node.sheet().matched_attributes(node, cx));

    if let Some(parent) = node.parent_node(cx) {
        let inherited = parent.view().attributes();
        cx.track_with(inherited.signal(), |parent_attributes| {
            attributes.extend(
                parent_attributes
                    .iter()
                    .filter(|a| a.is_inherited())
                    .cloned(),
            );
        });
    }
    attributes
}
